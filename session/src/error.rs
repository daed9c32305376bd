use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session field `{0}` is missing")]
    MissingField(&'static str),
}
