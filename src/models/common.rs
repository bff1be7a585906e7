use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 2次元ベクトル（位置・速度・方向の共通表現）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// ベクトルの長さ
    pub fn length(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2)).sqrt()
    }

    /// 2点間の距離
    pub fn distance(&self, other: &Vector2D) -> f64 {
        (*other - *self).length()
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 正規化（長さ0の場合はそのまま返す）
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    /// 原点まわりに `angle` ラジアン回転したベクトル
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// XY平面での角度（ラジアン）
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

/// エージェントの状態を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStatus {
    Active,      // アクティブ
    Destroyed,   // 撃破
    Inactive,    // 非アクティブ（命中・領域外で消滅した弾など）
}

/// 視線を遮る円形の障害物
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vector2D,
    pub radius: f64,
}

/// 矩形のアリーナと障害物
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub obstacles: Vec<Obstacle>,
}

impl Arena {
    pub fn contains(&self, p: Vector2D) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// 線分 `from`→`to` がどの障害物にも遮られないか
    pub fn is_path_clear(&self, from: Vector2D, to: Vector2D) -> bool {
        self.obstacles
            .iter()
            .all(|o| math_utils::segment_point_distance(from, to, o.center) > o.radius)
    }

    /// 線分 `from`→`to` が最初に障害物へ入る位置（線分上のパラメータ 0〜1）
    pub fn first_obstacle_entry(&self, from: Vector2D, to: Vector2D) -> Option<f64> {
        self.obstacles
            .iter()
            .filter_map(|o| math_utils::segment_circle_entry(from, to, o.center, o.radius))
            .min_by(f64::total_cmp)
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    use super::Vector2D;
    use std::f64::consts::PI;

    /// 角度を -π〜π の範囲に正規化
    pub fn normalize_angle(angle: f64) -> f64 {
        let mut normalized = angle % (2.0 * PI);
        if normalized > PI {
            normalized -= 2.0 * PI;
        } else if normalized <= -PI {
            normalized += 2.0 * PI;
        }
        normalized
    }

    /// 2つの方向の差（`from` から `to` への符号付き角度）
    pub fn angle_between(from: Vector2D, to: Vector2D) -> f64 {
        normalize_angle(to.angle() - from.angle())
    }

    /// 線分 ab と点 p の最短距離
    pub fn segment_point_distance(a: Vector2D, b: Vector2D, p: Vector2D) -> f64 {
        let ab = b - a;
        let len_sq = ab.dot(&ab);
        if len_sq == 0.0 {
            return a.distance(&p);
        }
        let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        (a + ab * t).distance(&p)
    }

    /// 線分 ab が円（中心 `center`, 半径 `radius`）に最初に触れる位置
    ///
    /// 線分上のパラメータ t（a で 0, b で 1）を返します。a が円内なら 0、触れなければ None
    pub fn segment_circle_entry(
        a: Vector2D,
        b: Vector2D,
        center: Vector2D,
        radius: f64,
    ) -> Option<f64> {
        let ac = a - center;
        let c = ac.dot(&ac) - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }

        let ab = b - a;
        let len_sq = ab.dot(&ab);
        let half_b = ab.dot(&ac);
        let discriminant = half_b * half_b - len_sq * c;
        if len_sq == 0.0 || discriminant < 0.0 {
            return None;
        }

        let t = (-half_b - discriminant.sqrt()) / len_sq;
        (0.0..=1.0).contains(&t).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vector2D::new(3.0, 4.0);
        let r = v.rotated(0.7);
        assert!(approx_eq(r.length(), 5.0));

        let quarter = Vector2D::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert!(approx_eq(quarter.x, 0.0));
        assert!(approx_eq(quarter.y, 1.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!(approx_eq(math_utils::normalize_angle(3.0 * PI), PI));
        assert!(approx_eq(math_utils::normalize_angle(-1.5 * PI), 0.5 * PI));
    }

    #[test]
    fn test_path_blocked_by_obstacle() {
        let arena = Arena {
            xmin: 0.0,
            xmax: 100.0,
            ymin: 0.0,
            ymax: 100.0,
            obstacles: vec![Obstacle {
                center: Vector2D::new(50.0, 50.0),
                radius: 5.0,
            }],
        };
        assert!(!arena.is_path_clear(Vector2D::new(0.0, 50.0), Vector2D::new(100.0, 50.0)));
        assert!(arena.is_path_clear(Vector2D::new(0.0, 10.0), Vector2D::new(100.0, 10.0)));
        assert!(arena.contains(Vector2D::new(100.0, 0.0)));
        assert!(!arena.contains(Vector2D::new(100.1, 0.0)));
    }

    #[test]
    fn test_segment_circle_entry() {
        let center = Vector2D::new(50.0, 0.0);
        let a = Vector2D::ZERO;
        let b = Vector2D::new(100.0, 0.0);
        assert!(approx_eq(math_utils::segment_circle_entry(a, b, center, 10.0).unwrap(), 0.4));
        // 始点が円内
        assert_eq!(math_utils::segment_circle_entry(center, b, center, 10.0), Some(0.0));
        // 手前で止まる・逸れる
        let short = Vector2D::new(30.0, 0.0);
        let aside = Vector2D::new(0.0, 100.0);
        assert_eq!(math_utils::segment_circle_entry(a, short, center, 10.0), None);
        assert_eq!(math_utils::segment_circle_entry(a, aside, center, 10.0), None);
    }

    #[test]
    fn test_first_obstacle_entry_picks_nearest() {
        let arena = Arena {
            xmin: 0.0,
            xmax: 100.0,
            ymin: 0.0,
            ymax: 100.0,
            obstacles: vec![
                Obstacle {
                    center: Vector2D::new(70.0, 10.0),
                    radius: 5.0,
                },
                Obstacle {
                    center: Vector2D::new(30.0, 10.0),
                    radius: 5.0,
                },
            ],
        };
        let (left, right) = (Vector2D::new(0.0, 10.0), Vector2D::new(100.0, 10.0));
        assert!(approx_eq(arena.first_obstacle_entry(left, right).unwrap(), 0.25));
        let (left, right) = (Vector2D::new(0.0, 90.0), Vector2D::new(100.0, 90.0));
        assert_eq!(arena.first_obstacle_entry(left, right), None);
    }
}
