//! # fuzzsim
//!
//! ファジィ推論による武器選択と照準誤差推定のエンジンです。
//!
//! - [`fuzzy`]: ファジィ集合・言語変数・ルール・推論モジュール
//! - [`models`]: 武器の望ましさ評価、照準誤差推定、武器システムとデモ用エージェント
//! - [`simulation`]: ボットと標的を動かすデモ用シミュレーション
//! - [`scenario`]: YAMLシナリオの読み込み

pub mod fuzzy;
pub mod logging;
pub mod models;
pub mod params;
pub mod scenario;
pub mod simulation;
