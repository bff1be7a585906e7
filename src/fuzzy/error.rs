use thiserror::Error;

/// ファジィモジュールの構築・参照エラー
///
/// ルールベースは起動時に一度だけ構築される静的なテーブルなので、
/// ここで返るエラーはすべてテーブル記述側のプログラミングエラーです。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuzzyError {
    #[error("未定義のファジィ変数: {0}")]
    UnknownVariable(String),

    #[error("未定義のファジィ集合: {variable}::{set}")]
    UnknownSet { variable: String, set: String },

    #[error("ファジィ変数名が重複しています: {0}")]
    DuplicateVariable(String),

    #[error("ファジィ集合名が重複しています: {variable}::{set}")]
    DuplicateSet { variable: String, set: String },

    #[error("不正なブレークポイント {set}: ({left}, {peak}, {right})")]
    InvalidBreakpoints {
        set: String,
        left: f64,
        peak: f64,
        right: f64,
    },

    #[error("変数を宣言する前に集合 {0} が追加されました")]
    SetWithoutVariable(String),

    #[error("子を持たない{0}演算子はルールに使用できません")]
    EmptyOperator(&'static str),
}
