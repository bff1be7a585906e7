// ファジィ集合とヘッジ
pub mod set;
pub mod hedge;

// 言語変数・前件式・ルール
pub mod variable;
pub mod term;
pub mod rule;

// 推論1回分のコンテキストと推論エンジン
pub mod context;
pub mod module;

pub mod error;

// 便利な re-export
pub use context::{Activations, Memberships, SetRef};
pub use error::FuzzyError;
pub use hedge::Hedge;
pub use module::{DefuzzifyMethod, FuzzyModule, FuzzyModuleBuilder};
pub use rule::{Consequent, Rule};
pub use set::{FuzzySet, SetShape};
pub use term::{Antecedent, Term};
pub use variable::LinguisticVariable;
