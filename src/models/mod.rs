// 基本的なデータ型と数学ユーティリティ
pub mod common;

// エージェントと武器の基本インターフェース（trait）定義
pub mod traits;

// 武器と照準
pub mod armory;
pub mod weapon;
pub mod aim;
pub mod weapon_system;

// 各エージェントモデルの実装
pub mod target;
pub mod sensor;
pub mod projectile;
pub mod bot;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use weapon::{ArmoryError, ShotPattern, Weapon, WeaponKind};
pub use aim::AimErrorEstimator;
pub use weapon_system::{select_best, AimConfig, WeaponSystem};
pub use target::Target;
pub use sensor::{DetectionEventType, DetectionStats, TargetingSensor};
pub use projectile::{Projectile, ProjectileEndReason};
pub use bot::{Bot, BotBody, BotView};
