// Copyright 2021 Datafuse Labs.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(non_snake_case)]

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

use backtrace::Backtrace;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ErrorCode>;

#[derive(Error)]
pub struct ErrorCode {
    code: u16,
    display_text: String,
    cause: Option<Box<dyn std::error::Error + Sync + Send>>,
    backtrace: Option<Backtrace>,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> String {
        self.display_text.clone()
    }

    pub fn add_message(self, msg: impl AsRef<str>) -> Self {
        Self {
            code: self.code,
            display_text: format!("{}\n{}", msg.as_ref(), self.display_text),
            cause: self.cause,
            backtrace: self.backtrace,
        }
    }
}

macro_rules! build_exceptions {
    ($($body:ident($code:expr)),*$(,)*) => {
        impl ErrorCode {
            $(
            pub fn $body(display_text: impl Into<String>) -> ErrorCode {
                ErrorCode {
                    code: $code,
                    display_text: display_text.into(),
                    cause: None,
                    backtrace: Some(Backtrace::new()),
                }
            }
            )*
        }
    }
}

build_exceptions! {
    Ok(0),
    BadArguments(1),
    ConnectionError(2),
    SnapshotUnavailable(3),
    CatalogFailure(4),
    PlannerFailure(5),
    QueryFailure(6),
    WriteFailure(7),
    RowScanFailure(8),
    UploadFailure(9),
    DALTransportError(10),
    Aborted(11),
    TokioError(12),

    UnknownException(1000),
}

impl ErrorCode {
    /// Used by worker pools to tell the root cause apart from the
    /// cooperative unwinding it triggers in sibling workers.
    pub fn is_aborted(&self) -> bool {
        self.code == 11
    }

    pub fn from_std_error<T: std::error::Error>(error: T) -> Self {
        ErrorCode {
            code: 1000,
            display_text: error.to_string(),
            cause: None,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.cause.as_ref() {
            Some(cause) => write!(
                f,
                "Code: {}, displayText = {}, cause: {}.",
                self.code, self.display_text, cause
            ),
            None => write!(
                f,
                "Code: {}, displayText = {}.",
                self.code, self.display_text
            ),
        }
    }
}

impl Debug for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Code: {}, displayText = {}.",
            self.code, self.display_text
        )?;
        match self.backtrace.as_ref() {
            None => Ok(()),
            Some(backtrace) => write!(f, "\n\n{:?}", backtrace),
        }
    }
}

#[derive(Error)]
enum OtherErrors {
    AnyHow { error: anyhow::Error },
}

impl Display for OtherErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OtherErrors::AnyHow { error } => write!(f, "{}", error),
        }
    }
}

impl Debug for OtherErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OtherErrors::AnyHow { error } => write!(f, "{:?}", error),
        }
    }
}

impl From<anyhow::Error> for ErrorCode {
    fn from(error: anyhow::Error) -> Self {
        ErrorCode {
            code: 1000,
            display_text: format!("{}", error),
            cause: Some(Box::new(OtherErrors::AnyHow { error })),
            backtrace: None,
        }
    }
}

impl From<std::io::Error> for ErrorCode {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::WriteFailure(format!("{}", error))
    }
}

impl From<mysql_async::Error> for ErrorCode {
    fn from(error: mysql_async::Error) -> Self {
        ErrorCode::ConnectionError(format!("{}", error))
    }
}

/// Maps a foreign error into an ErrorCode, attaching a lazily built context
/// message in front of the original error text.
pub trait ToErrorCode<T, E, CtxFn>
where E: Display + Send + Sync + 'static
{
    fn map_err_to_code<ErrFn, D>(self, make_exception: ErrFn, context_fn: CtxFn) -> Result<T>
    where
        ErrFn: FnOnce(String) -> ErrorCode,
        D: Display,
        CtxFn: FnOnce() -> D;
}

impl<T, E, CtxFn> ToErrorCode<T, E, CtxFn> for std::result::Result<T, E>
where E: Display + Send + Sync + 'static
{
    fn map_err_to_code<ErrFn, D>(self, make_exception: ErrFn, context_fn: CtxFn) -> Result<T>
    where
        ErrFn: FnOnce(String) -> ErrorCode,
        D: Display,
        CtxFn: FnOnce() -> D,
    {
        self.map_err(|error| {
            let err_text = format!("{}, cause: {}", context_fn(), error);
            make_exception(err_text)
        })
    }
}
