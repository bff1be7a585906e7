use tracing::info;

use crate::models::{
    common::{AgentStatus, Arena, Vector2D},
    traits::IAgent,
};

/// 標的エージェント
///
/// アリーナ内を一定速度で移動し、壁に当たると反射します。
/// 耐久値を持ち、弾の命中でダメージを受けて撃破されます。
#[derive(Debug, Clone)]
pub struct Target {
    /// ターゲットの一意識別子
    pub id: String,
    pub position: Vector2D,
    pub velocity: Vector2D,
    /// 移動速度の上限（偏差射撃の見積もりに使う）
    pub max_speed: f64,
    /// 当たり判定の半径
    pub radius: f64,
    /// 現在の耐久値（残りHP）
    pub hit_points: u32,
    /// 最大耐久値（初期HP）
    pub max_hit_points: u32,
    pub status: AgentStatus,
    /// 反射する矩形（最小角, 最大角）
    bounds: Option<(Vector2D, Vector2D)>,
}

impl Target {
    /// 新しいTargetインスタンスを作成
    ///
    /// # 引数
    ///
    /// * `id` - ターゲットの一意識別子
    /// * `position` - 初期位置
    /// * `velocity` - 初期速度（大きさが最大速度になる）
    /// * `hit_points` - 耐久値
    /// * `radius` - 当たり判定の半径
    pub fn new(
        id: String,
        position: Vector2D,
        velocity: Vector2D,
        hit_points: u32,
        radius: f64,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            max_speed: velocity.length(),
            radius,
            hit_points,
            max_hit_points: hit_points,
            status: AgentStatus::Active,
            bounds: None,
        }
    }

    /// アリーナの壁で反射するように設定
    pub fn with_bounds(mut self, arena: &Arena) -> Self {
        self.bounds = Some((
            Vector2D::new(arena.xmin + self.radius, arena.ymin + self.radius),
            Vector2D::new(arena.xmax - self.radius, arena.ymax - self.radius),
        ));
        self
    }

    /// ダメージを受ける
    ///
    /// 耐久値が0になった場合、ターゲットは破壊状態になります。
    pub fn take_damage(&mut self, damage: u32) {
        if self.status == AgentStatus::Active {
            self.hit_points = self.hit_points.saturating_sub(damage);
            if self.hit_points == 0 {
                self.status = AgentStatus::Destroyed;
                info!(target = %self.id, "ターゲット撃破");
            }
        }
    }

    fn bounce(&mut self) {
        let Some((min, max)) = self.bounds else {
            return;
        };

        if self.position.x < min.x {
            self.position.x = min.x + (min.x - self.position.x);
            self.velocity.x = self.velocity.x.abs();
        } else if self.position.x > max.x {
            self.position.x = max.x - (self.position.x - max.x);
            self.velocity.x = -self.velocity.x.abs();
        }

        if self.position.y < min.y {
            self.position.y = min.y + (min.y - self.position.y);
            self.velocity.y = self.velocity.y.abs();
        } else if self.position.y > max.y {
            self.position.y = max.y - (self.position.y - max.y);
            self.velocity.y = -self.velocity.y.abs();
        }

        // 反射量が矩形の幅を超える場合
        self.position.x = self.position.x.clamp(min.x, max.x.max(min.x));
        self.position.y = self.position.y.clamp(min.y, max.y.max(min.y));
    }
}

impl IAgent for Target {
    fn tick(&mut self, dt: f64) {
        if self.status == AgentStatus::Active {
            self.position = self.position + self.velocity * dt;
            self.bounce();
        }
    }

    fn get_id(&self) -> String {
        self.id.clone()
    }

    fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}
