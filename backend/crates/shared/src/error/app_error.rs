//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and the [`ErrorBody`] wire shape.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// すべてのハンドラは最終的にこの型へ失敗を畳み込み、
/// `{"code": <status>, "msg": <message>}` として返します。
///
/// ## Fields
/// * `kind` - エラーの分類（HTTP ステータスコードにマッピング）
/// * `message` - クライアントに返すメッセージ
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::NotFound, "No subscription found");
/// assert_eq!(err.status_code(), 404);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

/// エラーレスポンスのボディ
///
/// HTTP ステータスと `code` は常に一致します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
}

impl AppError {
    /// 新しいエラーを作成
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// エラー種別を取得
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP ステータスコードを取得
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// メッセージを取得
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// レスポンスボディへ変換
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.status_code(),
            msg: self.message.to_string(),
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code(), self.message)
    }
}

impl std::error::Error for AppError {}
