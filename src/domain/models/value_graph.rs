// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 值图模型
//!
//! 对象和数组以 `Rc<RefCell<..>>` 句柄共享，同一实例可以出现在图中多个位置，
//! 也可以形成环。节点身份取自句柄的分配地址。

use crate::utils::errors::{StringifyError, StringifyResult};
use serde::Serialize;
use serde_json::{Number, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// 数组容器句柄
pub type ArrayRef = Rc<RefCell<Vec<Node>>>;

/// 对象容器句柄，条目按插入顺序保存
pub type ObjectRef = Rc<RefCell<Vec<(String, Node)>>>;

/// 容器节点的引用身份
///
/// 两个内容相同但分别构造的容器拥有不同的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    fn of<T>(rc: &Rc<T>) -> Self {
        NodeId(Rc::as_ptr(rc) as *const () as usize)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 值图中的节点
///
/// 克隆一个容器节点只会复制句柄，克隆结果与原节点共享身份
#[derive(Clone)]
pub enum Node {
    /// "无值"：在对象中省略该键，在数组中输出为 null
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
}

impl Node {
    /// 新建一个空对象
    pub fn object() -> Self {
        Node::Object(Rc::new(RefCell::new(Vec::new())))
    }

    /// 新建一个空数组
    pub fn array() -> Self {
        Node::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// 浮点数节点，NaN 与无穷大按 JSON 规则变为 null
    pub fn float(value: f64) -> Self {
        Number::from_f64(value).map_or(Node::Null, Node::Number)
    }

    /// 从任意可序列化的值构造节点树
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> StringifyResult<Self> {
        Ok(Node::from(serde_json::to_value(value)?))
    }

    /// 容器节点的身份，标量没有身份
    pub fn identity(&self) -> Option<NodeId> {
        match self {
            Node::Array(items) => Some(NodeId::of(items)),
            Node::Object(entries) => Some(NodeId::of(entries)),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    /// 在对象中设置键值
    ///
    /// 已存在的键保留原位置，只替换值
    pub fn set(&self, key: impl Into<String>, value: impl Into<Node>) -> StringifyResult<()> {
        let Node::Object(entries) = self else {
            return Err(StringifyError::NotAnObject(self.kind()));
        };

        let key = key.into();
        let value = value.into();
        let mut entries = entries.borrow_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
        Ok(())
    }

    /// 向数组末尾追加元素
    pub fn push(&self, value: impl Into<Node>) -> StringifyResult<()> {
        let Node::Array(items) = self else {
            return Err(StringifyError::NotAnArray(self.kind()));
        };
        items.borrow_mut().push(value.into());
        Ok(())
    }

    /// 读取对象中的键，返回的容器与图中的实例共享身份
    pub fn get(&self, key: &str) -> Option<Node> {
        match self {
            Node::Object(entries) => entries
                .borrow()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// 容器中的条目数，标量为 0
    pub fn len(&self) -> usize {
        match self {
            Node::Array(items) => items.borrow().len(),
            Node::Object(entries) => entries.borrow().len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空容器
    ///
    /// 环上的 `Rc` 互相持有，不清空任何一环就不会被释放
    pub fn clear(&self) {
        match self {
            Node::Array(items) => items.borrow_mut().clear(),
            Node::Object(entries) => entries.borrow_mut().clear(),
            _ => {}
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Undefined => "undefined",
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }
}

// 默认的析构会沿着嵌套层级递归，很深的链会耗尽栈空间。
// 最后一个句柄被释放时，把子节点移到显式栈上逐个释放。
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            take_children(&mut node, &mut pending);
        }
    }
}

/// 仅当 `node` 持有容器的最后一个句柄时取出其子节点
fn take_children(node: &mut Node, pending: &mut Vec<Node>) {
    match node {
        Node::Array(items) => {
            if let Some(cell) = Rc::get_mut(items) {
                pending.append(cell.get_mut());
            }
        }
        Node::Object(entries) => {
            if let Some(cell) = Rc::get_mut(entries) {
                pending.extend(cell.get_mut().drain(..).map(|(_, v)| v));
            }
        }
        _ => {}
    }
}

// 派生的 Debug 会沿着环无限递归，容器只打印身份与长度
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Undefined => f.write_str("Undefined"),
            Node::Null => f.write_str("Null"),
            Node::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Node::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Node::String(s) => f.debug_tuple("String").field(s).finish(),
            Node::Array(_) | Node::Object(_) => {
                let id = self.identity().map(|id| id.to_string()).unwrap_or_default();
                write!(f, "{}({}, len={})", self.kind(), id, self.len())
            }
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => {
                Node::Array(Rc::new(RefCell::new(items.into_iter().map(Node::from).collect())))
            }
            Value::Object(map) => Node::Object(Rc::new(RefCell::new(
                map.into_iter().map(|(k, v)| (k, Node::from(v))).collect(),
            ))),
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => {
                Node::Array(Rc::new(RefCell::new(items.iter().map(Node::from).collect())))
            }
            Value::Object(map) => Node::Object(Rc::new(RefCell::new(
                map.iter().map(|(k, v)| (k.clone(), Node::from(v))).collect(),
            ))),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(value.into())
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        Node::Number(value.into())
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Number(value.into())
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}
