use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::models::{Arena, Obstacle, Vector2D, WeaponKind};
use crate::params::ParamTable;

/// シナリオメタデータ
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

/// シミュレーション設定
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub dt_s: f64,
    pub t_max_s: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Position2D {
    pub x_m: f64,
    pub y_m: f64,
}

impl Position2D {
    pub fn to_vector(self) -> Vector2D {
        Vector2D::new(self.x_m, self.y_m)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Velocity2D {
    pub x_mps: f64,
    pub y_mps: f64,
}

impl Velocity2D {
    pub fn to_vector(self) -> Vector2D {
        Vector2D::new(self.x_mps, self.y_mps)
    }
}

/// アリーナ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct ArenaConfig {
    pub xmin_m: f64,
    pub xmax_m: f64,
    pub ymin_m: f64,
    pub ymax_m: f64,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ObstacleConfig {
    pub center: Position2D,
    pub radius_m: f64,
}

impl ArenaConfig {
    pub fn to_arena(&self) -> Arena {
        Arena {
            xmin: self.xmin_m,
            xmax: self.xmax_m,
            ymin: self.ymin_m,
            ymax: self.ymax_m,
            obstacles: self
                .obstacles
                .iter()
                .map(|o| Obstacle {
                    center: o.center.to_vector(),
                    radius: o.radius_m,
                })
                .collect(),
        }
    }
}

/// ボット設定
#[derive(Debug, Deserialize, Serialize)]
pub struct BotConfig {
    pub id: String,
    pub position: Position2D,
    /// 初期進行方向（度、+x軸から反時計回り）
    #[serde(default)]
    pub heading_deg: f64,
    #[serde(default)]
    pub speed_mps: f64,
    /// 弾速の遅い武器で偏差射撃を行うか
    #[serde(default)]
    pub lead_target: bool,
    /// 初期装備（ブラスターとナイフに加えて所持する武器）
    #[serde(default)]
    pub weapons: Vec<WeaponKind>,
}

/// 標的設定
#[derive(Debug, Deserialize, Serialize)]
pub struct TargetConfig {
    pub id: String,
    pub position: Position2D,
    pub velocity: Velocity2D,
    pub hit_points: u32,
    pub radius_m: f64,
}

/// 武器ピックアップ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct PickupConfig {
    pub time_s: f64,
    pub weapon: WeaponKind,
}

/// 完全なシナリオ設定
#[derive(Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub arena: ArenaConfig,
    pub bot: BotConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub pickups: Vec<PickupConfig>,
    /// パラメータ上書き（例: `RocketLauncher_FiringFreq: 2.0`）
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::ParseError(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::ParseError(Path::new("<inline>").to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// 既定値に上書きを適用したパラメータテーブル
    pub fn param_table(&self) -> ParamTable {
        ParamTable::with_overrides(&self.params)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // 時間設定の検証
        if self.sim.dt_s <= 0.0 {
            return Err(ScenarioError::ValidationError("dt_s must be positive".to_string()));
        }
        if self.sim.t_max_s <= 0.0 {
            return Err(ScenarioError::ValidationError("t_max_s must be positive".to_string()));
        }

        let arena = &self.arena;
        if arena.xmin_m >= arena.xmax_m || arena.ymin_m >= arena.ymax_m {
            return Err(ScenarioError::ValidationError("Invalid arena bounds".to_string()));
        }
        if arena.obstacles.iter().any(|o| o.radius_m <= 0.0) {
            return Err(ScenarioError::ValidationError(
                "Obstacle radius must be positive".to_string(),
            ));
        }

        if !self.is_position_in_bounds(self.bot.position) {
            return Err(ScenarioError::ValidationError(format!(
                "Bot {} outside arena",
                self.bot.id
            )));
        }
        if !self.is_position_in_bounds(self.target.position) {
            return Err(ScenarioError::ValidationError(format!(
                "Target {} outside arena",
                self.target.id
            )));
        }
        if self.target.hit_points == 0 || self.target.radius_m <= 0.0 {
            return Err(ScenarioError::ValidationError(format!(
                "Target {} needs positive hit_points and radius_m",
                self.target.id
            )));
        }

        for pickup in &self.pickups {
            if pickup.time_s < 0.0 || pickup.time_s >= self.sim.t_max_s {
                return Err(ScenarioError::ValidationError(format!(
                    "Pickup {:?} time {} outside [0, {})",
                    pickup.weapon, pickup.time_s, self.sim.t_max_s
                )));
            }
        }

        for (name, value) in &self.params {
            if !value.is_finite() {
                return Err(ScenarioError::ValidationError(format!("Param {} is not finite", name)));
            }
        }

        Ok(())
    }

    /// 位置がアリーナ内かどうかをチェック
    fn is_position_in_bounds(&self, position: Position2D) -> bool {
        let arena = &self.arena;
        position.x_m >= arena.xmin_m
            && position.x_m <= arena.xmax_m
            && position.y_m >= arena.ymin_m
            && position.y_m <= arena.ymax_m
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("時間刻み: {:.3}秒", self.sim.dt_s);
        println!("最大時間: {:.1}秒", self.sim.t_max_s);
        println!("シード値: {}", self.sim.seed);
        println!();

        println!("=== アリーナ ===");
        println!(
            "範囲: x[{:.0}, {:.0}] y[{:.0}, {:.0}]",
            self.arena.xmin_m, self.arena.xmax_m, self.arena.ymin_m, self.arena.ymax_m
        );
        println!("障害物: {}個", self.arena.obstacles.len());
        println!();

        println!("=== ボット ===");
        println!(
            "{}: 位置 ({:.0}, {:.0}) 偏差射撃: {}",
            self.bot.id,
            self.bot.position.x_m,
            self.bot.position.y_m,
            if self.bot.lead_target { "有効" } else { "無効" }
        );
        let weapons: Vec<&str> = self.bot.weapons.iter().map(|w| w.name()).collect();
        let extra = if weapons.is_empty() { "なし".to_string() } else { weapons.join(", ") };
        println!("追加装備: {}", extra);
        println!();

        println!("=== 標的 ===");
        println!(
            "{}: 位置 ({:.0}, {:.0}) 速度 {:.1} 耐久値 {}",
            self.target.id,
            self.target.position.x_m,
            self.target.position.y_m,
            self.target.velocity.to_vector().length(),
            self.target.hit_points
        );

        if !self.pickups.is_empty() {
            println!();
            println!("=== ピックアップ ===");
            for pickup in &self.pickups {
                println!("  {:.1}秒: {}", pickup.time_s, pickup.weapon.name());
            }
        }

        if !self.params.is_empty() {
            println!();
            println!("=== パラメータ上書き ===");
            for (name, value) in &self.params {
                println!("  {} = {}", name, value);
            }
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug)]
pub enum ScenarioError {
    FileNotFound(std::path::PathBuf),
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::FileNotFound(path) => {
                write!(f, "シナリオファイルが見つかりません: {}", path.display())
            }
            ScenarioError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ScenarioError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
