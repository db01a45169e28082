//! Test utilities for vimshim.
//!
//! [`FakeVim`] is an in-memory host. It evaluates the small subset of Vim
//! expressions and commands the shim emits, and can present itself as any
//! of the supported API generations.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::{HostError, HostResult};
use crate::host::{BufferHandle, Host, HostFeatures, SegmentInfo, WindowHandle};
use crate::value::{FuncRef, HostValue, Value};

const BUILTINS: &[&str] = &[
    "bufname",
    "exists",
    "function",
    "getbufvar",
    "getwinvar",
    "has_key",
    "mode",
    "strtrans",
];

#[derive(Debug, Default)]
struct FakeBuffer {
    name: Vec<u8>,
    vars: BTreeMap<String, HostValue>,
    options: BTreeMap<String, HostValue>,
}

impl FakeBuffer {
    fn new(name: &[u8]) -> Self {
        let options = [
            ("filetype", HostValue::Bytes(Vec::new())),
            ("fileformat", HostValue::Bytes(b"unix".to_vec())),
            ("fileencoding", HostValue::Bytes(Vec::new())),
            ("modified", HostValue::from(0)),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
        Self {
            name: name.to_vec(),
            vars: BTreeMap::new(),
            options,
        }
    }
}

#[derive(Debug)]
struct FakeWindow {
    id: u64,
    number: u64,
    vars: BTreeMap<String, HostValue>,
}

#[derive(Debug, Default)]
struct State {
    globals: BTreeMap<String, HostValue>,
    buffers: BTreeMap<u64, FakeBuffer>,
    windows: Vec<FakeWindow>,
    env: BTreeMap<String, String>,
    current_buffer: u64,
    current_window: u64,
    log: Vec<String>,
}

/// An in-memory host.
///
/// Starts with buffer 1 (unnamed) shown in window 1 (window ID 1000).
#[derive(Debug)]
pub struct FakeVim {
    features: HostFeatures,
    version: i64,
    state: RefCell<State>,
}

impl FakeVim {
    fn with_features(features: HostFeatures, version: i64) -> Self {
        let mut state = State {
            current_buffer: 1,
            current_window: 1000,
            ..State::default()
        };
        state.buffers.insert(1, FakeBuffer::new(b""));
        state.windows.push(FakeWindow {
            id: 1000,
            number: 1,
            vars: BTreeMap::new(),
        });
        Self {
            features,
            version,
            state: RefCell::new(state),
        }
    }

    /// A host with string evaluation only.
    pub fn legacy() -> Self {
        Self::with_features(HostFeatures::default(), 702)
    }

    /// A current host with every structured entry point.
    pub fn structured() -> Self {
        Self::with_features(
            HostFeatures {
                bindeval: true,
                vars: true,
                options: true,
            },
            801,
        )
    }

    /// An old host with typed evaluation but variable tables too unstable
    /// to use, and no option tables.
    pub fn structured_old() -> Self {
        Self::with_features(
            HostFeatures {
                bindeval: true,
                vars: true,
                options: false,
            },
            703,
        )
    }

    /// Builds the segment context for a buffer shown in a window.
    pub fn segment_info(bufnr: u64, window_id: u64, winnr: u64) -> SegmentInfo {
        SegmentInfo {
            buffer: BufferHandle(bufnr),
            bufnr,
            window: WindowHandle(window_id),
            winnr,
        }
    }

    /// Adds a buffer; an empty name means unnamed.
    pub fn add_buffer(&self, number: u64, name: &[u8]) {
        self.state
            .borrow_mut()
            .buffers
            .insert(number, FakeBuffer::new(name));
    }

    /// Adds a window.
    pub fn add_window(&self, id: u64, number: u64) {
        self.state.borrow_mut().windows.push(FakeWindow {
            id,
            number,
            vars: BTreeMap::new(),
        });
    }

    /// Makes `buffer` the current buffer.
    pub fn set_current_buffer(&self, buffer: u64) {
        self.state.borrow_mut().current_buffer = buffer;
    }

    /// Sets `g:name`.
    pub fn set_global(&self, name: &str, value: HostValue) {
        self.state
            .borrow_mut()
            .globals
            .insert(name.to_string(), value);
    }

    /// Sets `b:name` of an existing buffer.
    pub fn set_buffer_var(&self, buffer: u64, name: &str, value: HostValue) {
        if let Some(buffer) = self.state.borrow_mut().buffers.get_mut(&buffer) {
            buffer.vars.insert(name.to_string(), value);
        }
    }

    /// Sets a buffer-local option of an existing buffer.
    pub fn set_buffer_option(&self, buffer: u64, name: &str, value: HostValue) {
        if let Some(buffer) = self.state.borrow_mut().buffers.get_mut(&buffer) {
            buffer.options.insert(name.to_string(), value);
        }
    }

    /// Sets `w:name` of an existing window.
    pub fn set_window_var(&self, window_id: u64, name: &str, value: HostValue) {
        let mut state = self.state.borrow_mut();
        if let Some(window) = state.windows.iter_mut().find(|w| w.id == window_id) {
            window.vars.insert(name.to_string(), value);
        }
    }

    /// Every expression, command and call the host received, in order.
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    /// Forgets the recorded log.
    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn record(&self, entry: String) {
        self.state.borrow_mut().log.push(entry);
    }

    fn require(&self, enabled: bool, feature: &str) -> HostResult<()> {
        if enabled {
            Ok(())
        } else {
            Err(HostError::unsupported(feature))
        }
    }

    fn evaluate(&self, expr: &str) -> HostResult<HostValue> {
        let state = self.state.borrow();
        let mut parser = Parser {
            state: &state,
            src: expr.as_bytes(),
            pos: 0,
        };
        let value = parser.expr()?;
        parser.skip_ws();
        if parser.pos != parser.src.len() {
            return Err(HostError::new(format!("E15: Invalid expression: \"{expr}\"")));
        }
        Ok(value)
    }
}

impl Host for FakeVim {
    fn features(&self) -> HostFeatures {
        self.features
    }

    fn eval(&self, expr: &str) -> HostResult<Value> {
        self.record(format!("eval: {expr}"));
        self.evaluate(expr).map(legacy_repr)
    }

    fn command(&self, cmd: &str) -> HostResult<()> {
        self.record(format!("command: {cmd}"));
        let not_a_command = || HostError::new(format!("E492: Not an editor command: {cmd}"));

        if let Some(target) = cmd
            .strip_prefix("unlet! ")
            .or_else(|| cmd.strip_prefix("unlet "))
        {
            let target = target.trim();
            let removed = match target.strip_prefix("g:") {
                Some(name) => self.state.borrow_mut().globals.remove(name).is_some(),
                None => return Err(not_a_command()),
            };
            if !removed && !cmd.starts_with("unlet!") {
                return Err(HostError::new(format!("E108: No such variable: \"{target}\"")));
            }
            return Ok(());
        }

        let assignment = cmd.strip_prefix("let ").ok_or_else(not_a_command)?;
        let (target, expr) = assignment.split_once('=').ok_or_else(not_a_command)?;
        let target = target.trim();
        let value = self.evaluate(expr.trim())?;

        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        if let Some(name) = target.strip_prefix('$') {
            let text = String::from_utf8_lossy(value.as_bytes().unwrap_or_default()).into_owned();
            state.env.insert(name.to_string(), text);
        } else if let Some(name) = target.strip_prefix("g:") {
            state.globals.insert(name.to_string(), value);
        } else if let Some(name) = target.strip_prefix("b:") {
            if let Some(buffer) = state.buffers.get_mut(&state.current_buffer) {
                buffer.vars.insert(name.to_string(), value);
            }
        } else if let Some(name) = target.strip_prefix("w:") {
            let current = state.current_window;
            if let Some(window) = state.windows.iter_mut().find(|w| w.id == current) {
                window.vars.insert(name.to_string(), value);
            }
        } else {
            return Err(HostError::new(format!("E461: Illegal variable name: {target}")));
        }
        Ok(())
    }

    fn current_buffer(&self) -> BufferHandle {
        BufferHandle(self.state.borrow().current_buffer)
    }

    fn function(&self, name: &str) -> HostResult<FuncRef> {
        self.require(self.features.bindeval, "bindeval")?;
        self.record(format!("function: {name}"));
        if BUILTINS.contains(&name) {
            Ok(FuncRef::new(name))
        } else {
            Err(HostError::new(format!("E700: Unknown function: {name}")))
        }
    }

    fn call(&self, func: &FuncRef, args: &[HostValue]) -> HostResult<HostValue> {
        self.require(self.features.bindeval, "bindeval")?;
        self.record(format!("call: {}", func.name()));
        call_builtin(&self.state.borrow(), func.name(), args)
    }

    fn buffer_name(&self, buffer: BufferHandle) -> HostResult<Option<Vec<u8>>> {
        self.require(self.features.bindeval, "bindeval")?;
        let state = self.state.borrow();
        let buffer = state
            .buffers
            .get(&buffer.0)
            .ok_or_else(|| HostError::new(format!("E86: Buffer {} does not exist", buffer.0)))?;
        Ok(Some(buffer.name.clone()).filter(|name| !name.is_empty()))
    }

    fn vvar(&self, name: &str) -> HostResult<Option<HostValue>> {
        self.require(self.features.vars, "vvars")?;
        Ok((name == "version").then(|| HostValue::from(self.version)))
    }

    fn global_var(&self, name: &str) -> HostResult<Option<HostValue>> {
        self.require(self.features.vars, "vars")?;
        Ok(self.state.borrow().globals.get(name).cloned())
    }

    fn buffer_var(&self, buffer: BufferHandle, name: &str) -> HostResult<Option<HostValue>> {
        self.require(self.features.vars, "buffer vars")?;
        let state = self.state.borrow();
        let buffer = state
            .buffers
            .get(&buffer.0)
            .ok_or_else(|| HostError::new(format!("E86: Buffer {} does not exist", buffer.0)))?;
        Ok(buffer.vars.get(name).cloned())
    }

    fn window_var(&self, window: WindowHandle, name: &str) -> HostResult<Option<HostValue>> {
        self.require(self.features.vars, "window vars")?;
        let state = self.state.borrow();
        let window = state
            .windows
            .iter()
            .find(|w| w.id == window.0)
            .ok_or_else(|| HostError::new(format!("E957: Invalid window ID {}", window.0)))?;
        Ok(window.vars.get(name).cloned())
    }

    fn buffer_option(&self, buffer: BufferHandle, name: &str) -> HostResult<Option<HostValue>> {
        self.require(self.features.options, "options")?;
        let state = self.state.borrow();
        let buffer = state
            .buffers
            .get(&buffer.0)
            .ok_or_else(|| HostError::new(format!("E86: Buffer {} does not exist", buffer.0)))?;
        Ok(buffer.options.get(name).cloned())
    }
}

/// What the legacy `eval` hands back: every scalar as text.
fn legacy_repr(value: HostValue) -> Value {
    match value {
        HostValue::Dictionary(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, legacy_repr(item)))
                .collect(),
        ),
        HostValue::List(items) => Value::Array(items.into_iter().map(legacy_repr).collect()),
        HostValue::Function(func) => Value::String(func.name().to_string()),
        HostValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        HostValue::Native(value) => legacy_native(value),
    }
}

fn legacy_native(value: Value) -> Value {
    match value {
        Value::Null => Value::String("v:null".to_string()),
        Value::Bool(b) => Value::String(if b { "v:true" } else { "v:false" }.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(text) => Value::String(text),
        Value::Array(items) => Value::Array(items.into_iter().map(legacy_native).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, legacy_native(item)))
                .collect(),
        ),
    }
}

fn to_number(value: &HostValue) -> i64 {
    match value {
        HostValue::Native(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        other => other
            .as_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or_default(),
    }
}

fn text_arg(args: &[HostValue], index: usize) -> Vec<u8> {
    args.get(index)
        .and_then(HostValue::as_bytes)
        .map(<[u8]>::to_vec)
        .unwrap_or_default()
}

fn flag(value: bool) -> HostValue {
    HostValue::from(i64::from(value))
}

fn empty() -> HostValue {
    HostValue::Bytes(Vec::new())
}

fn dictionary(vars: &BTreeMap<String, HostValue>) -> HostValue {
    HostValue::Dictionary(
        vars.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

fn call_builtin(state: &State, name: &str, args: &[HostValue]) -> HostResult<HostValue> {
    match name {
        "exists" => {
            let target = String::from_utf8_lossy(&text_arg(args, 0)).into_owned();
            let current_window = state.windows.iter().find(|w| w.id == state.current_window);
            let current_buffer = state.buffers.get(&state.current_buffer);
            let found = if let Some(var) = target.strip_prefix("g:") {
                state.globals.contains_key(var)
            } else if let Some(var) = target.strip_prefix("b:") {
                current_buffer.is_some_and(|b| b.vars.contains_key(var))
            } else if let Some(var) = target.strip_prefix("w:") {
                current_window.is_some_and(|w| w.vars.contains_key(var))
            } else if let Some(var) = target.strip_prefix("v:") {
                var == "version"
            } else if let Some(option) = target.strip_prefix('&') {
                current_buffer.is_some_and(|b| b.options.contains_key(option))
            } else if let Some(var) = target.strip_prefix('$') {
                state.env.contains_key(var)
            } else if let Some(func) = target.strip_prefix('*') {
                BUILTINS.contains(&func)
            } else {
                state.globals.contains_key(&target)
            };
            Ok(flag(found))
        }
        "has_key" => match args.first() {
            Some(HostValue::Dictionary(entries)) => {
                let key = text_arg(args, 1);
                Ok(flag(entries.iter().any(|(k, _)| k.as_bytes() == key)))
            }
            _ => Err(HostError::new("E715: Dictionary required")),
        },
        "getbufvar" => {
            let number = args.first().map(to_number).unwrap_or_default();
            let var = String::from_utf8_lossy(&text_arg(args, 1)).into_owned();
            let number = if number == 0 {
                state.current_buffer
            } else {
                number as u64
            };
            let Some(buffer) = state.buffers.get(&number) else {
                return Ok(empty());
            };
            Ok(if var.is_empty() {
                dictionary(&buffer.vars)
            } else if let Some(option) = var.strip_prefix('&') {
                buffer.options.get(option).cloned().unwrap_or_else(empty)
            } else {
                buffer.vars.get(&var).cloned().unwrap_or_else(empty)
            })
        }
        "getwinvar" => {
            let number = args.first().map(to_number).unwrap_or_default();
            let var = String::from_utf8_lossy(&text_arg(args, 1)).into_owned();
            let window = if number == 0 {
                state.windows.iter().find(|w| w.id == state.current_window)
            } else {
                state.windows.iter().find(|w| w.number == number as u64)
            };
            let Some(window) = window else {
                return Ok(empty());
            };
            Ok(if var.is_empty() {
                dictionary(&window.vars)
            } else {
                window.vars.get(&var).cloned().unwrap_or_else(empty)
            })
        }
        "bufname" => {
            let number = args.first().map(to_number).unwrap_or_default() as u64;
            Ok(state
                .buffers
                .get(&number)
                .map(|buffer| HostValue::Bytes(buffer.name.clone()))
                .unwrap_or_else(empty))
        }
        "strtrans" => Ok(HostValue::Bytes(strtrans(&text_arg(args, 0)).into_bytes())),
        "mode" => Ok(HostValue::Bytes(b"n".to_vec())),
        "function" => {
            let func = String::from_utf8_lossy(&text_arg(args, 0)).into_owned();
            if BUILTINS.contains(&func.as_str()) {
                Ok(HostValue::Function(FuncRef::new(func)))
            } else {
                Err(HostError::new(format!("E700: Unknown function: {func}")))
            }
        }
        _ => Err(HostError::new(format!("E117: Unknown function: {name}"))),
    }
}

/// Vim's display rendering under a UTF-8 `&encoding`.
fn strtrans(bytes: &[u8]) -> String {
    let mut out = String::new();
    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '\u{7f}' => out.push_str("^?"),
                ch if ch < ' ' => {
                    out.push('^');
                    out.push(char::from(ch as u8 + b'@'));
                }
                ch => out.push(ch),
            }
        }
        for byte in chunk.invalid() {
            out.push_str(&format!("<{byte:02x}>"));
        }
    }
    out
}

struct Parser<'a> {
    state: &'a State,
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self) -> HostError {
        HostError::new(format!(
            "E15: Invalid expression: \"{}\"",
            String::from_utf8_lossy(self.src)
        ))
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> HostResult<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn expr(&mut self) -> HostResult<HostValue> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => self.double_quoted().map(HostValue::Bytes),
            Some(b'\'') => self.single_quoted().map(HostValue::Bytes),
            Some(b'[') => self.list(),
            Some(b'{') => self.dictionary(),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(b'$') => {
                self.pos += 1;
                let name = self.word();
                let value = self.state.env.get(&name).cloned().unwrap_or_default();
                Ok(HostValue::Bytes(value.into_bytes()))
            }
            Some(b'&') => {
                self.pos += 1;
                let name = self.word();
                self.state
                    .buffers
                    .get(&self.state.current_buffer)
                    .and_then(|buffer| buffer.options.get(&name).cloned())
                    .ok_or_else(|| HostError::new(format!("E113: Unknown option: {name}")))
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                let name = self.word();
                if self.eat(b'(') {
                    let args = self.items(b')')?;
                    call_builtin(self.state, &name, &args)
                } else {
                    self.variable(&name)
                }
            }
            _ => Err(self.error()),
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'#'))
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn variable(&self, name: &str) -> HostResult<HostValue> {
        let state = self.state;
        let undefined = || HostError::new(format!("E121: Undefined variable: {name}"));
        let found = if let Some(var) = name.strip_prefix("g:") {
            state.globals.get(var).cloned()
        } else if let Some(var) = name.strip_prefix("b:") {
            state
                .buffers
                .get(&state.current_buffer)
                .and_then(|b| b.vars.get(var).cloned())
        } else if let Some(var) = name.strip_prefix("w:") {
            state
                .windows
                .iter()
                .find(|w| w.id == state.current_window)
                .and_then(|w| w.vars.get(var).cloned())
        } else {
            match name {
                "v:true" | "true" => Some(HostValue::Native(Value::Bool(true))),
                "v:false" | "false" => Some(HostValue::Native(Value::Bool(false))),
                "v:null" | "null" => Some(HostValue::Native(Value::Null)),
                _ => None,
            }
        };
        found.ok_or_else(undefined)
    }

    fn items(&mut self, close: u8) -> HostResult<Vec<HostValue>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.expr()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(b',')?;
        }
    }

    fn list(&mut self) -> HostResult<HostValue> {
        self.expect(b'[')?;
        self.items(b']').map(HostValue::List)
    }

    fn dictionary(&mut self) -> HostResult<HostValue> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        if self.eat(b'}') {
            return Ok(HostValue::Dictionary(entries));
        }
        loop {
            let key = self.expr()?;
            let key = String::from_utf8_lossy(key.as_bytes().ok_or_else(|| self.error())?)
                .into_owned();
            self.expect(b':')?;
            entries.push((key, self.expr()?));
            if self.eat(b'}') {
                return Ok(HostValue::Dictionary(entries));
            }
            self.expect(b',')?;
        }
    }

    fn number(&mut self) -> HostResult<HostValue> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).map_err(|_| self.error())?;
        if let Ok(n) = text.parse::<i64>() {
            return Ok(HostValue::from(n));
        }
        text.parse::<f64>()
            .map(|f| HostValue::Native(Value::from(f)))
            .map_err(|_| self.error())
    }

    fn single_quoted(&mut self) -> HostResult<Vec<u8>> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error()),
                Some(b'\'') if self.src.get(self.pos + 1) == Some(&b'\'') => {
                    out.push(b'\'');
                    self.pos += 2;
                }
                Some(b'\'') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b) => {
                    out.push(b);
                    self.pos += 1;
                }
            }
        }
    }

    fn double_quoted(&mut self) -> HostResult<Vec<u8>> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error());
            };
            self.pos += 1;
            match b {
                b'"' => return Ok(out),
                b'\\' => {
                    let Some(escape) = self.peek() else {
                        return Err(self.error());
                    };
                    self.pos += 1;
                    match escape {
                        b'n' => out.push(b'\n'),
                        b't' => out.push(b'\t'),
                        b'r' => out.push(b'\r'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'e' => out.push(0x1b),
                        b'x' | b'X' => {
                            let byte = self.hex(2)?;
                            out.push(byte as u8);
                        }
                        b'u' => {
                            let code = self.hex(4)?;
                            let ch = char::from_u32(code).ok_or_else(|| self.error())?;
                            let mut buf = [0; 4];
                            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
    }

    fn hex(&mut self, digits: usize) -> HostResult<u32> {
        let end = self.pos + digits;
        let text = self
            .src
            .get(self.pos..end)
            .and_then(|slice| std::str::from_utf8(slice).ok())
            .ok_or_else(|| self.error())?;
        let value = u32::from_str_radix(text, 16).map_err(|_| self.error())?;
        self.pos = end;
        Ok(value)
    }
}
