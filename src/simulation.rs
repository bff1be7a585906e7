//! # Simulation モジュール
//!
//! 武器選択と照準を確認するためのデモ用シミュレーションエンジンを提供します。
//!
//! 1体のボットが、アリーナ内を反射しながら移動する標的を追跡し、
//! ファジィ推論で武器を選んで射撃します。固定時間刻み（Δt）で進行します。
//!
//! ## シミュレーション処理順序
//!
//! 各時間刻みにおいて、以下の順序で処理が実行されます：
//!
//! 1. **標的処理**: 移動と壁での反射
//! 2. **弾処理**: 運動更新、命中・遮蔽・領域外判定
//! 3. **センサー処理**: 射撃可能判定、視認時間の更新
//! 4. **ボット処理**: 武器選択、照準、発射
//! 5. **ピックアップ処理**: 時刻に達した武器の取得
//!
//! ## 使用例
//!
//! ```no_run
//! use fuzzsim::scenario::ScenarioConfig;
//! use fuzzsim::simulation::SimulationEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScenarioConfig::from_file("scenarios/duel.yaml")?;
//! let mut engine = SimulationEngine::new(config, 1)?;
//! engine.initialize()?;
//! engine.run();
//! engine.stats().print_summary();
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info, trace, warn};

use crate::models::*;
use crate::scenario::*;

/// ステップ数の安全上限
const MAX_STEPS: u64 = 1_000_000;

/// 1ティックの間に武器システムから要求された発射
#[derive(Debug, Default)]
pub struct ShotQueue {
    pub requests: Vec<(WeaponKind, Vector2D, Vector2D)>,
}

impl IProjectileSink for ShotQueue {
    fn fire_projectile(&mut self, kind: WeaponKind, origin: Vector2D, aim: Vector2D) {
        self.requests.push((kind, origin, aim));
    }
}

/// シミュレーション統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    /// 武器種類ごとの発射弾数
    pub shots_fired: [u32; WeaponKind::COUNT],
    /// 武器種類ごとの命中数
    pub hits: [u32; WeaponKind::COUNT],
    /// 武器の持ち替え履歴（時刻, 持ち替え後の武器）
    pub weapon_switches: Vec<(f64, WeaponKind)>,
    /// 標的の撃破時刻
    pub target_destroyed_at: Option<f64>,
    pub final_hit_points: u32,
    /// ボットのセンサーの検知統計
    pub detection: DetectionStats,
    pub elapsed_time: f64,
    pub steps: u64,
}

impl SimulationStats {
    pub fn total_shots(&self) -> u32 {
        self.shots_fired.iter().sum()
    }

    pub fn total_hits(&self) -> u32 {
        self.hits.iter().sum()
    }

    pub fn print_summary(&self) {
        println!("=== シミュレーション結果 ===");
        println!("経過時間: {:.2}秒 ({}ステップ)", self.elapsed_time, self.steps);
        match self.target_destroyed_at {
            Some(t) => println!("標的撃破: {:.2}秒", t),
            None => println!("標的残存: 耐久値 {}", self.final_hit_points),
        }
        println!();
        println!("{:<16} {:>8} {:>8}", "武器", "発射", "命中");
        for kind in WeaponKind::ALL {
            println!(
                "{:<16} {:>8} {:>8}",
                kind.name(),
                self.shots_fired[kind.index()],
                self.hits[kind.index()]
            );
        }
        println!();
        println!(
            "検知: 発見 {}回 / 見失い {}回{}",
            self.detection.first_detections,
            self.detection.lost_detections,
            if self.detection.currently_tracking { "（追跡中）" } else { "" }
        );
        println!("持ち替え: {}回", self.weapon_switches.len());
        for (time, kind) in &self.weapon_switches {
            println!("  {:>7.2}秒 → {}", time, kind.name());
        }
    }
}

/// 時刻付きピックアップの状態
#[derive(Debug, Clone)]
struct PendingPickup {
    time: f64,
    weapon: WeaponKind,
    taken: bool,
}

pub struct SimulationEngine {
    pub current_time: f64,
    pub dt: f64,
    pub max_time: f64,
    pub seed: u64,
    pub step_count: u64,

    pub arena: Arena,
    pub bot: Bot,
    pub target: Target,
    pub projectiles: Vec<Projectile>,

    /// 武器種類ごとの命中ダメージ
    damage: [u32; WeaponKind::COUNT],
    pickups: Vec<PendingPickup>,
    shot_queue: ShotQueue,
    next_projectile_id: u64,
    stats: SimulationStats,

    pub scenario_config: ScenarioConfig,
    pub verbose_level: u8,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Result<Self, ArmoryError> {
        let params = scenario.param_table();
        let arena = scenario.arena.to_arena();

        let heading = Vector2D::new(1.0, 0.0).rotated(scenario.bot.heading_deg.to_radians());
        let mut body = BotBody::new(
            scenario.bot.position.to_vector(),
            heading,
            params.get_positive("Bot_MaxTurnRate")?,
        );
        body.velocity = body.heading * scenario.bot.speed_mps;

        let sensor_range = params.get_positive("Bot_SensorRange")?;
        let sensor = TargetingSensor::new(scenario.bot.id.clone(), sensor_range);
        let aim_config =
            AimConfig::from_params(&params, scenario.bot.lead_target, scenario.sim.seed)?;
        let mut damage = [0; WeaponKind::COUNT];
        for kind in WeaponKind::ALL {
            damage[kind.index()] = params.get_count(&format!("{}_Damage", kind.name()))?;
        }

        let weapons = WeaponSystem::new(params, aim_config)?;
        let bot = Bot::new(scenario.bot.id.clone(), body, sensor, weapons);

        let target = Target::new(
            scenario.target.id.clone(),
            scenario.target.position.to_vector(),
            scenario.target.velocity.to_vector(),
            scenario.target.hit_points,
            scenario.target.radius_m,
        )
        .with_bounds(&arena);

        let pickups = scenario
            .pickups
            .iter()
            .map(|p| PendingPickup {
                time: p.time_s,
                weapon: p.weapon,
                taken: false,
            })
            .collect();

        Ok(Self {
            current_time: 0.0,
            dt: scenario.sim.dt_s,
            max_time: scenario.sim.t_max_s,
            seed: scenario.sim.seed,
            step_count: 0,
            arena,
            bot,
            target,
            projectiles: Vec::new(),
            damage,
            pickups,
            shot_queue: ShotQueue::default(),
            next_projectile_id: 0,
            stats: SimulationStats::default(),
            scenario_config: scenario,
            verbose_level,
        })
    }

    /// 初期装備の付与
    pub fn initialize(&mut self) -> Result<(), ArmoryError> {
        if self.verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
        }

        for &kind in &self.scenario_config.bot.weapons {
            self.bot.weapons.add_weapon(kind)?;
        }

        if self.verbose_level > 0 {
            info!("初期化完了:");
            info!("  ボット: {} 装備 {:?}", self.bot.id, self.bot.weapons.render_desirabilities());
            info!("  標的: {} (耐久値 {})", self.target.id, self.target.hit_points);
            info!("  障害物: {}個", self.arena.obstacles.len());
            info!("  ピックアップ: {}件", self.pickups.len());
        }

        Ok(())
    }

    /// 標的撃破・最大時間・ステップ上限のいずれかまで実行します
    pub fn run(&mut self) -> &SimulationStats {
        info!("=== シミュレーション実行開始 ===");

        while self.current_time < self.max_time && self.target.is_active() {
            self.step();

            if self.verbose_level > 2 {
                trace!("時刻: {:.2}秒 (ステップ: {})", self.current_time, self.step_count);
            }

            if self.step_count % 100 == 0 && self.verbose_level > 0 {
                let progress = (self.current_time / self.max_time) * 100.0;
                info!(
                    "進行状況: {:.1}% ({:.1}/{:.1}秒)",
                    progress, self.current_time, self.max_time
                );
            }

            if self.step_count >= MAX_STEPS {
                break;
            }
        }

        self.stats.elapsed_time = self.current_time;
        self.stats.steps = self.step_count;
        self.stats.final_hit_points = self.target.hit_points;
        self.stats.detection = self.bot.sensor.get_detection_stats();

        info!("=== シミュレーション完了 ===");
        info!(
            time = self.current_time,
            steps = self.step_count,
            shots = self.stats.total_shots(),
            hits = self.stats.total_hits(),
            "実行結果"
        );

        &self.stats
    }

    pub fn step(&mut self) {
        self.process_target();
        self.process_projectiles();
        self.process_sensor();
        self.process_bot();
        self.process_pickups();

        self.current_time += self.dt;
        self.step_count += 1;
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    fn process_target(&mut self) {
        self.target.tick(self.dt);
    }

    fn process_projectiles(&mut self) {
        for projectile in &mut self.projectiles {
            let reason = projectile.update(self.dt, &mut self.target, &self.arena);
            if reason == Some(ProjectileEndReason::Hit) {
                self.stats.hits[projectile.kind.index()] += 1;
                debug!(
                    weapon = projectile.kind.name(),
                    hit_points = self.target.hit_points,
                    time = self.current_time,
                    "命中"
                );
                if !self.target.is_active() && self.stats.target_destroyed_at.is_none() {
                    self.stats.target_destroyed_at = Some(self.current_time);
                }
            }
        }

        self.projectiles.retain(|p| p.is_active());
    }

    fn process_sensor(&mut self) {
        self.bot.perceive(&self.target, &self.arena, self.current_time);
    }

    fn process_bot(&mut self) {
        let previous = self.bot.weapons.current_kind();

        self.bot.tick(self.dt);
        self.bot.decide(&self.arena, self.dt, &mut self.shot_queue);

        let current = self.bot.weapons.current_kind();
        if current != previous {
            self.stats.weapon_switches.push((self.current_time, current));
            info!(
                from = previous.name(),
                to = current.name(),
                time = self.current_time,
                distance = self.bot.body.position.distance(&self.target.position),
                "武器選択"
            );
        }

        for (kind, origin, aim) in self.shot_queue.requests.drain(..) {
            let Some(speed) = self.bot.weapons.weapon(kind).map(|w| w.projectile_speed()) else {
                warn!(weapon = kind.name(), "所持していない武器からの発射要求");
                continue;
            };
            self.next_projectile_id += 1;

            self.projectiles.push(Projectile::new(
                format!("{}_P{:05}", self.bot.id, self.next_projectile_id),
                kind,
                origin,
                aim,
                speed,
                self.damage[kind.index()],
            ));
            self.stats.shots_fired[kind.index()] += 1;
        }
    }

    fn process_pickups(&mut self) {
        for pickup in self.pickups.iter_mut().filter(|p| !p.taken) {
            if self.current_time >= pickup.time {
                pickup.taken = true;
                match self.bot.weapons.add_weapon(pickup.weapon) {
                    Ok(()) => info!(
                        weapon = pickup.weapon.name(),
                        rounds = self.bot.weapons.rounds_remaining(pickup.weapon),
                        time = self.current_time,
                        "ピックアップ取得"
                    ),
                    Err(e) => warn!(weapon = pickup.weapon.name(), error = %e, "ピックアップ失敗"),
                }
            }
        }
    }
}
