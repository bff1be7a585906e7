use tracing::debug;

use crate::models::{
    common::{Arena, Vector2D},
    target::Target,
    traits::IAgent,
};

/// 照準用センサー
///
/// ボット1体ぶんの目標認識を管理します。射程内かつ視線が通っているとき
/// 目標を「射撃可能」とみなし、見えている時間と見失ってからの時間を追跡します。
/// 見失った後も最後に観測した位置と速度を記憶しておきます。
#[derive(Debug, Clone)]
pub struct TargetingSensor {
    /// 所有ボットのID
    pub owner_id: String,
    /// 探知範囲
    pub range: f64,
    target_id: Option<String>,
    target_present: bool,
    shootable: bool,
    last_position: Option<Vector2D>,
    last_velocity: Vector2D,
    target_max_speed: f64,
    /// 射撃可能になった時刻
    time_became_visible: f64,
    /// 最後に射撃可能だった時刻
    time_last_visible: f64,
    current_time: f64,
    first_detections: usize,
    lost_detections: usize,
}

/// 検知イベントの種類
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionEventType {
    /// 視界に入った
    FirstDetected,
    /// 視界から外れた（射程外・遮蔽・撃破）
    Lost,
}

/// 検知統計情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionStats {
    pub first_detections: usize,
    pub lost_detections: usize,
    pub currently_tracking: bool,
}

impl TargetingSensor {
    /// 新しいセンサーを作成します
    ///
    /// # 引数
    ///
    /// * `owner_id` - 所有ボットのID
    /// * `range` - 探知範囲
    pub fn new(owner_id: String, range: f64) -> Self {
        Self {
            owner_id,
            range,
            target_id: None,
            target_present: false,
            shootable: false,
            last_position: None,
            last_velocity: Vector2D::ZERO,
            target_max_speed: 0.0,
            time_became_visible: 0.0,
            time_last_visible: f64::NEG_INFINITY,
            current_time: 0.0,
            first_detections: 0,
            lost_detections: 0,
        }
    }

    /// ターゲットの認識状態を更新します
    ///
    /// # 引数
    ///
    /// * `owner` - センサー（ボット）の位置
    /// * `target` - 追跡対象
    /// * `arena` - 視線判定に使う障害物
    /// * `current_time` - 現在のシミュレーション時刻（秒）
    pub fn update(&mut self, owner: Vector2D, target: &Target, arena: &Arena, current_time: f64) {
        self.current_time = current_time;
        let was_shootable = self.shootable;

        let distance = owner.distance(&target.position);

        if target.is_active() {
            self.target_max_speed = target.max_speed;
            self.shootable = distance <= self.range && arena.is_path_clear(owner, target.position);
        } else {
            self.last_position = None;
            self.last_velocity = Vector2D::ZERO;
            self.shootable = false;
        }

        if self.shootable {
            if !was_shootable {
                self.time_became_visible = current_time;
                self.record(target, distance, DetectionEventType::FirstDetected);
            }
            self.time_last_visible = current_time;
            self.last_position = Some(target.position);
            self.last_velocity = target.velocity;
        } else if was_shootable {
            self.record(target, distance, DetectionEventType::Lost);
        }

        // 一度も見ていない目標は存在を知らない
        self.target_present = target.is_active() && self.last_position.is_some();
        self.target_id = self.target_present.then(|| target.id.clone());
    }

    fn record(&mut self, target: &Target, distance: f64, event_type: DetectionEventType) {
        debug!(
            sensor = %self.owner_id,
            target = %target.id,
            distance,
            event = ?event_type,
            time = self.current_time,
            "検知状態変化"
        );
        match event_type {
            DetectionEventType::FirstDetected => self.first_detections += 1,
            DetectionEventType::Lost => self.lost_detections += 1,
        }
    }

    pub fn is_target_present(&self) -> bool {
        self.target_present
    }

    pub fn is_target_shootable(&self) -> bool {
        self.shootable
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    /// 最後に観測した目標位置
    pub fn last_position(&self) -> Option<Vector2D> {
        self.last_position
    }

    pub fn last_velocity(&self) -> Vector2D {
        self.last_velocity
    }

    pub fn target_max_speed(&self) -> f64 {
        self.target_max_speed
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// 目標が連続して見えている時間（見えていなければ 0）
    pub fn time_target_visible(&self) -> f64 {
        if self.shootable {
            self.current_time - self.time_became_visible
        } else {
            0.0
        }
    }

    /// 目標が視界から外れている時間（一度も見ていなければ無限大）
    pub fn time_target_out_of_view(&self) -> f64 {
        if self.shootable {
            0.0
        } else {
            self.current_time - self.time_last_visible
        }
    }

    /// 検知統計の取得
    pub fn get_detection_stats(&self) -> DetectionStats {
        DetectionStats {
            first_detections: self.first_detections,
            lost_detections: self.lost_detections,
            currently_tracking: self.shootable,
        }
    }
}
