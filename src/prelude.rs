pub(crate) use crate::error::{DecodeError, Error, Result};
