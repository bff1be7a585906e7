use rand::RngCore;

use crate::models::{common::Vector2D, weapon::WeaponKind};

/// 全てのシミュレーションエージェントが実装する基本インターフェース
pub trait IAgent {
    /// 1ティックの処理実行
    fn tick(&mut self, dt: f64);

    /// エージェントIDの取得
    fn get_id(&self) -> String;

    /// エージェントがアクティブかどうか
    fn is_active(&self) -> bool;
}

/// 照準・武器選択が参照するセンサーと世界の問い合わせ
///
/// 操舵や視線判定の実装はこのインターフェースの外側にあり、
/// 武器システムはここから得られる値だけで判断します。
pub trait ITargetingContext {
    /// 射手（ボット）の位置
    fn owner_position(&self) -> Vector2D;

    /// 射手の進行方向（単位ベクトル）
    fn owner_heading(&self) -> Vector2D;

    /// 射手の速度ベクトル
    fn owner_velocity(&self) -> Vector2D;

    /// 現在のシミュレーション時刻（秒）
    fn current_time(&self) -> f64;

    /// ターゲットが存在するか
    fn is_target_present(&self) -> bool;

    /// ターゲットが射程内かつ視線が通っているか
    fn is_target_shootable(&self) -> bool;

    /// ターゲットの位置（最後に観測した位置）
    fn target_position(&self) -> Option<Vector2D>;

    /// ターゲットの速度ベクトル（絶対速度）
    fn target_velocity(&self) -> Vector2D;

    /// ターゲットの最大速度
    fn target_max_speed(&self) -> f64;

    /// ターゲットまでの距離
    fn distance_to_target(&self) -> f64;

    /// ターゲットが連続して見えている時間（秒）
    fn time_target_visible(&self) -> f64;

    /// ターゲットが視界から外れている時間（秒）
    fn time_target_out_of_view(&self) -> f64;

    /// 射手から `point` まで視線が通るか
    fn has_line_of_sight(&self, point: Vector2D) -> bool;

    /// 照準方向を `point` へ向けて回転させ、向き終わっていれば true
    fn rotate_facing_toward(&mut self, point: Vector2D) -> bool;
}

/// 弾の発射先（生成と物理は外部が担当する）
pub trait IProjectileSink {
    fn fire_projectile(&mut self, kind: WeaponKind, origin: Vector2D, aim: Vector2D);
}

/// 武器の共通インターフェース
pub trait IWeapon {
    /// 武器の種類
    fn kind(&self) -> WeaponKind;

    /// `aim` に向けて発射（クールダウン中・弾切れなら何もしない）
    ///
    /// # 戻り値
    ///
    /// 実際に発射した場合は true
    fn shoot_at(
        &mut self,
        origin: Vector2D,
        aim: Vector2D,
        now: f64,
        rng: &mut dyn RngCore,
        sink: &mut dyn IProjectileSink,
    ) -> bool;

    /// 目標距離に対する望ましさ（0〜100）を計算し、表示用に保持する
    fn desirability(&mut self, distance: f64) -> f64;

    /// 最後に計算した望ましさ
    fn last_desirability_score(&self) -> f64;

    /// 残弾数
    fn rounds_remaining(&self) -> u32;

    /// 弾の追加（最大携行数でクリップ）
    fn increment_rounds(&mut self, count: u32);

    /// 次弾が撃てる状態か
    fn is_ready_for_next_shot(&self, now: f64) -> bool;

    /// 描画用の武器外形（ローカル座標）
    fn outline(&self) -> &'static [Vector2D];
}
