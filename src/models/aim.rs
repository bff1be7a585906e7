use tracing::warn;

use crate::fuzzy::{Consequent, DefuzzifyMethod, FuzzyError, FuzzyModule, Term};
use crate::models::common::Vector2D;

/// 目標までの距離
pub const DIST_TO_TARGET: &str = "DistToTarget";
/// 目標の相対速度の大きさ
pub const VELOCITY: &str = "Velocity";
/// 目標が見えている時間
pub const TIME_VISIBLE: &str = "TimeVisible";
/// 出力: 照準誤差（ラジアン）
pub const DEVIATION: &str = "Deviation";

/// 照準誤差推定器
///
/// 距離・接近速度・視認時間の3入力から照準のぶれ幅（ラジアン）を推定します。
/// 近く・遅く・長く見えている目標ほど誤差は小さくなります。
#[derive(Debug, Clone)]
pub struct AimErrorEstimator {
    module: FuzzyModule,
    /// 最後に推定した誤差（表示用）
    last_deviation: f64,
}

impl AimErrorEstimator {
    pub fn new() -> Result<Self, FuzzyError> {
        Ok(Self {
            module: deviation_module()?,
            last_deviation: 0.0,
        })
    }

    /// 照準誤差を推定します
    ///
    /// # 引数
    ///
    /// * `distance` - 目標までの距離
    /// * `velocity` - 目標の相対速度ベクトル（大きさを速度として使う）
    /// * `visible_time` - 目標が連続して見えている時間（秒）
    ///
    /// # 戻り値
    ///
    /// ぶれ幅（ラジアン、0以上）
    pub fn estimate_deviation(
        &mut self,
        distance: f64,
        velocity: Vector2D,
        visible_time: f64,
    ) -> f64 {
        let speed = velocity.length();
        let inputs = [(DIST_TO_TARGET, distance), (VELOCITY, speed), (TIME_VISIBLE, visible_time)];

        let deviation = self
            .module
            .infer(&inputs, DEVIATION, DefuzzifyMethod::MaxAv)
            .unwrap_or_else(|e| {
                warn!(error = %e, "照準誤差の推論に失敗");
                0.0
            })
            .max(0.0);

        self.last_deviation = deviation;
        deviation
    }

    pub fn last_deviation(&self) -> f64 {
        self.last_deviation
    }

    pub fn module(&self) -> &FuzzyModule {
        &self.module
    }
}

fn deviation_module() -> Result<FuzzyModule, FuzzyError> {
    const DISTANCES: [&str; 3] = ["Target_Close", "Target_Medium", "Target_Far"];
    const VISIBILITY: [&str; 3] = ["Visible_Long", "Visible_Moderate", "Visible_Brief"];
    const SPEEDS: [&str; 3] = ["Velocity_Fast", "Velocity_Medium", "Velocity_Slow"];

    // [距離][視認時間][速度] → 誤差集合
    const TABLE: [[[&str; 3]; 3]; 3] = [
        // Target_Close
        [
            ["DeviationMedium", "SmallDeviation", "SmallDeviation"],
            ["BigDeviation", "DeviationMedium", "SmallDeviation"],
            ["BigDeviation", "BigDeviation", "DeviationMedium"],
        ],
        // Target_Medium
        [
            ["DeviationMedium", "SmallDeviation", "SmallDeviation"],
            ["BigDeviation", "DeviationMedium", "SmallDeviation"],
            ["BigDeviation", "BigDeviation", "DeviationMedium"],
        ],
        // Target_Far
        [
            ["DeviationMedium", "DeviationMedium", "DeviationMedium"],
            ["BigDeviation", "DeviationMedium", "SmallDeviation"],
            ["BigDeviation", "BigDeviation", "DeviationMedium"],
        ],
    ];

    let mut builder = FuzzyModule::builder()
        .variable(DIST_TO_TARGET)
        .left_shoulder("Target_Close", 0.0, 15.0, 45.0)
        .triangular("Target_Medium", 15.0, 75.0, 150.0)
        .right_shoulder("Target_Far", 75.0, 150.0, 10000.0)
        .variable(TIME_VISIBLE)
        .right_shoulder("Visible_Long", 4.0, 6.0, 100.0)
        .triangular("Visible_Moderate", 2.0, 4.0, 6.0)
        .left_shoulder("Visible_Brief", 0.0, 2.0, 4.0)
        .variable(VELOCITY)
        .right_shoulder("Velocity_Fast", 75.0, 150.0, 300.0)
        .triangular("Velocity_Medium", 15.0, 75.0, 150.0)
        .left_shoulder("Velocity_Slow", 0.0, 15.0, 45.0)
        .variable(DEVIATION)
        .right_shoulder("BigDeviation", 0.15, 0.25, 0.3)
        .triangular("DeviationMedium", 0.05, 0.15, 0.2)
        .left_shoulder("SmallDeviation", 0.0, 0.05, 0.1);

    for (dist, plane) in DISTANCES.iter().zip(TABLE) {
        for (visible, row) in VISIBILITY.iter().zip(plane) {
            for (speed, deviation) in SPEEDS.iter().zip(row) {
                builder = builder.rule(
                    Term::and([
                        Term::set(DIST_TO_TARGET, *dist),
                        Term::set(TIME_VISIBLE, *visible),
                        Term::set(VELOCITY, *speed),
                    ]),
                    Consequent::set(DEVIATION, deviation),
                );
            }
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn representative(module: &FuzzyModule, set: &str) -> f64 {
        let var = module.variable(DEVIATION).unwrap();
        let id = var.set_id(set).unwrap();
        var.set(id).unwrap().representative_value()
    }

    #[test]
    fn test_close_slow_long_visible_gives_smallest_deviation() {
        let mut aim = AimErrorEstimator::new().unwrap();
        let deviation = aim.estimate_deviation(0.0, Vector2D::ZERO, 30.0);

        let small = representative(aim.module(), "SmallDeviation");
        let medium = representative(aim.module(), "DeviationMedium");
        let big = representative(aim.module(), "BigDeviation");
        assert!(small < medium && medium < big);
        assert!((deviation - small).abs() < 1e-12);
        assert!((aim.last_deviation() - small).abs() < 1e-12);
    }

    #[test]
    fn test_fast_briefly_seen_target_is_hard_to_hit() {
        let mut aim = AimErrorEstimator::new().unwrap();
        let calm = aim.estimate_deviation(100.0, Vector2D::new(5.0, 0.0), 10.0);
        let hard = aim.estimate_deviation(100.0, Vector2D::new(120.0, 160.0), 0.5);
        assert!(hard > calm);
    }

    #[test]
    fn test_speed_is_velocity_norm() {
        let mut aim = AimErrorEstimator::new().unwrap();
        let diagonal = aim.estimate_deviation(60.0, Vector2D::new(30.0, 40.0), 3.0);
        let axis = aim.estimate_deviation(60.0, Vector2D::new(50.0, 0.0), 3.0);
        assert!((diagonal - axis).abs() < 1e-12);
    }

    #[test]
    fn test_deviation_is_never_negative() {
        let mut aim = AimErrorEstimator::new().unwrap();
        for d in [0.0, 20.0, 80.0, 200.0, 20000.0] {
            for s in [0.0, 30.0, 100.0, 400.0] {
                for t in [0.0, 1.0, 3.0, 5.0, 50.0] {
                    let dev = aim.estimate_deviation(d, Vector2D::new(s, 0.0), t);
                    assert!((0.0..=0.3).contains(&dev), "{} {} {} -> {}", d, s, t, dev);
                }
            }
        }
    }
}
