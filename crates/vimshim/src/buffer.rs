//! Buffer options and names.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::func::HostFunc;
use crate::host::{BufferHandle, Host, SegmentInfo};
use crate::marshal::to_native;
use crate::value::{HostValue, Value};
use crate::vars::is_empty_text;

#[derive(Clone)]
pub(crate) enum BufferOptions {
    Stub,
    /// `getbufvar(nr, "&option")`, with `exists("&option")` deciding
    /// whether an empty result means "no such option".
    Legacy {
        getbufvar: HostFunc,
        exists: HostFunc,
    },
    Structured {
        host: Rc<dyn Host>,
    },
}

impl fmt::Debug for BufferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stub => "BufferOptions::Stub",
            Self::Legacy { .. } => "BufferOptions::Legacy",
            Self::Structured { .. } => "BufferOptions::Structured",
        })
    }
}

impl BufferOptions {
    pub(crate) fn get(&self, info: &SegmentInfo, option: &str) -> Result<Value> {
        let qualified = format!("&{option}");
        match self {
            Self::Stub => Err(Error::not_found(qualified)),
            Self::Structured { host } => match host.buffer_option(info.buffer, option)? {
                Some(value) => to_native(&value),
                None => Err(Error::not_found(qualified)),
            },
            Self::Legacy { getbufvar, exists } => {
                let value = getbufvar
                    .call_native(&[HostValue::from(info.bufnr as i64), qualified.as_str().into()])?;
                if is_empty_text(&value)
                    && !exists.call(&[qualified.as_str().into()])?.is_truthy()
                {
                    return Err(Error::not_found(qualified));
                }
                Ok(value)
            }
        }
    }
}

#[derive(Clone)]
pub(crate) enum BufferNames {
    Stub,
    Legacy { bufname: HostFunc },
    Structured { host: Rc<dyn Host> },
}

impl fmt::Debug for BufferNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stub => "BufferNames::Stub",
            Self::Legacy { .. } => "BufferNames::Legacy",
            Self::Structured { .. } => "BufferNames::Structured",
        })
    }
}

impl BufferNames {
    pub(crate) fn get(&self, buffer: BufferHandle) -> Result<Option<Vec<u8>>> {
        let name = match self {
            Self::Stub => None,
            Self::Structured { host } => host.buffer_name(buffer)?,
            Self::Legacy { bufname } => bufname
                .call(&[HostValue::from(buffer.0 as i64)])?
                .as_bytes()
                .map(<[u8]>::to_vec),
        };
        Ok(name.filter(|name| !name.is_empty()))
    }
}
