// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::StringifySettings;
use crate::domain::models::value_graph::{ArrayRef, Node, NodeId, ObjectRef};
use crate::utils::errors::{StringifyError, StringifyResult};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io;
use tracing::{debug, trace, warn};

/// 标准 JSON 编码器允许的最大缩进
const MAX_INDENT: usize = 10;

/// 单次序列化的统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringifyReport {
    /// 实际展开的容器数量
    pub containers_visited: usize,
    /// 因重复访问而被省略的容器引用数量
    pub references_omitted: usize,
}

/// 环安全的值图序列化器
///
/// 深度优先遍历值图并输出带缩进的 JSON。每个容器实例在一次调用中只展开一次，
/// 之后再遇到同一实例时按"无值"处理：对象中的键被省略，数组中的元素输出为 null。
/// 不仅是真正的环，同一实例在兄弟分支中的第二次出现也会被省略。
///
/// 遍历使用显式栈，嵌套深度只受内存限制，不受调用栈限制。
///
/// # Examples
///
/// ```
/// use safe_stringify::domain::models::value_graph::Node;
/// use safe_stringify::domain::services::stringify_service::CycleSafeSerializer;
///
/// let o = Node::object();
/// o.set("self", o.clone()).unwrap();
///
/// assert_eq!(CycleSafeSerializer::new().serialize(&o), "{}");
/// # o.clear();
/// ```
#[derive(Debug, Clone)]
pub struct CycleSafeSerializer {
    indent: usize,
}

impl Default for CycleSafeSerializer {
    fn default() -> Self {
        Self::from_settings(&StringifySettings::default())
    }
}

impl CycleSafeSerializer {
    /// 创建使用两个空格缩进的序列化器
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定每层缩进的空格数，超过 10 按 10 处理，0 输出紧凑的单行 JSON
    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent: indent.min(MAX_INDENT),
        }
    }

    pub fn from_settings(settings: &StringifySettings) -> Self {
        Self::with_indent(settings.indent)
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// 序列化值图
    ///
    /// 对任何输入都返回文本，不会失败，也不会因环而无限递归
    pub fn serialize(&self, node: &Node) -> String {
        self.serialize_with_report(node).0
    }

    /// 序列化值图并返回遍历统计
    pub fn serialize_with_report(&self, node: &Node) -> (String, StringifyReport) {
        let mut buf = Vec::with_capacity(128);
        let result = self.write_to(node, &mut buf);
        // 写入 Vec 不会产生 I/O 错误，节点也不会触发编码错误
        debug_assert!(result.is_ok(), "rendering into memory failed: {:?}", result.as_ref().err());
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Unexpected failure while rendering value graph");
                StringifyReport::default()
            }
        };
        let text = String::from_utf8(buf)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        (text, report)
    }

    /// 将值图编码写入任意输出目标
    ///
    /// # Returns
    ///
    /// * `Ok(StringifyReport)` - 写入成功
    /// * `Err(StringifyError::Io)` - 输出目标写入失败
    pub fn write_to<W: io::Write>(&self, node: &Node, mut writer: W) -> StringifyResult<StringifyReport> {
        let traversal = Traversal::default();
        if self.indent == 0 {
            Emitter::new(CompactFormatter, &mut writer, &traversal).run(node)?;
        } else {
            let indent = vec![b' '; self.indent];
            Emitter::new(PrettyFormatter::with_indent(&indent), &mut writer, &traversal).run(node)?;
        }
        Ok(traversal.report())
    }

    /// 序列化任意实现了 `Serialize` 的值，例如请求或响应 DTO
    pub fn serialize_serializable<T: Serialize + ?Sized>(&self, value: &T) -> StringifyResult<String> {
        let node = Node::from_serialize(value)?;
        Ok(self.serialize(&node))
    }

    /// 以 debug 级别输出值图
    pub fn log_graph(&self, label: &str, node: &Node) {
        let (text, report) = self.serialize_with_report(node);
        debug!(
            label,
            containers_visited = report.containers_visited,
            references_omitted = report.references_omitted,
            "{}",
            text
        );
    }
}

/// 使用默认缩进序列化值图
pub fn safe_stringify(node: &Node) -> String {
    CycleSafeSerializer::new().serialize(node)
}

/// 一次调用内的遍历状态，调用结束即丢弃
#[derive(Default)]
struct Traversal {
    seen: RefCell<HashSet<NodeId>>,
    omitted: Cell<usize>,
}

impl Traversal {
    /// 判断节点是否应当输出内容
    ///
    /// 容器首次出现时登记身份并返回 true，再次出现返回 false；
    /// Undefined 总是返回 false；其他标量总是返回 true
    fn admit(&self, node: &Node) -> bool {
        if matches!(node, Node::Undefined) {
            return false;
        }
        let Some(id) = node.identity() else {
            return true;
        };
        let fresh = self.seen.borrow_mut().insert(id);
        if !fresh {
            self.omitted.set(self.omitted.get() + 1);
            trace!(node = %id, kind = node.kind(), "Omitting already visited container");
        }
        fresh
    }

    fn report(&self) -> StringifyReport {
        StringifyReport {
            containers_visited: self.seen.borrow().len(),
            references_omitted: self.omitted.get(),
        }
    }
}

/// 显式栈上的一个已打开容器
///
/// 持有容器句柄的克隆，每一步只在读取下一个子节点时短暂借用
enum Frame {
    Array { items: ArrayRef, next: usize },
    Object { entries: ObjectRef, next: usize, written: bool },
}

/// 栈顶容器的下一步动作
enum Step {
    /// 子节点已通过 admit，输出其内容
    Open(Node),
    /// 数组中被省略的元素
    Null,
    /// 栈顶容器的子节点已全部输出
    Close,
}

/// 迭代式输出器
///
/// 按 serde_json 序列化器调用 `Formatter` 的顺序驱动格式化器，
/// 因此无环输入的输出与 `serde_json` 的标准编码逐字节一致
struct Emitter<'a, F, W> {
    formatter: F,
    writer: &'a mut W,
    traversal: &'a Traversal,
    stack: Vec<Frame>,
}

impl<'a, F: Formatter, W: io::Write> Emitter<'a, F, W> {
    fn new(formatter: F, writer: &'a mut W, traversal: &'a Traversal) -> Self {
        Self {
            formatter,
            writer,
            traversal,
            stack: Vec::new(),
        }
    }

    fn run(mut self, root: &Node) -> StringifyResult<()> {
        // 根节点在全新的集合中一定是首次出现，admit 只用于登记身份
        if self.traversal.admit(root) {
            self.open(root)?;
        } else {
            self.formatter.write_null(&mut *self.writer)?;
        }

        loop {
            let step = match self.stack.last_mut() {
                None => break,
                Some(Frame::Array { items, next }) => {
                    let child = items.borrow().get(*next).cloned();
                    match child {
                        None => Step::Close,
                        Some(child) => {
                            self.formatter.begin_array_value(&mut *self.writer, *next == 0)?;
                            *next += 1;
                            if self.traversal.admit(&child) {
                                Step::Open(child)
                            } else {
                                Step::Null
                            }
                        }
                    }
                }
                Some(Frame::Object {
                    entries,
                    next,
                    written,
                }) => loop {
                    let entry = entries.borrow().get(*next).cloned();
                    let Some((key, child)) = entry else {
                        break Step::Close;
                    };
                    *next += 1;
                    if !self.traversal.admit(&child) {
                        continue;
                    }
                    self.formatter.begin_object_key(&mut *self.writer, !*written)?;
                    *written = true;
                    serde_json::to_writer(&mut *self.writer, &key).map_err(encoding_error)?;
                    self.formatter.end_object_key(&mut *self.writer)?;
                    self.formatter.begin_object_value(&mut *self.writer)?;
                    break Step::Open(child);
                },
            };

            match step {
                Step::Open(child) => {
                    if !self.open(&child)? {
                        self.end_value()?;
                    }
                }
                Step::Null => {
                    self.formatter.write_null(&mut *self.writer)?;
                    self.end_value()?;
                }
                Step::Close => {
                    match self.stack.pop() {
                        Some(Frame::Array { .. }) => self.formatter.end_array(&mut *self.writer)?,
                        Some(Frame::Object { .. }) => self.formatter.end_object(&mut *self.writer)?,
                        None => {}
                    }
                    self.end_value()?;
                }
            }
        }

        Ok(())
    }

    /// 输出标量，或打开容器并压栈；压栈时返回 true
    fn open(&mut self, node: &Node) -> StringifyResult<bool> {
        match node {
            Node::Array(items) => {
                self.formatter.begin_array(&mut *self.writer)?;
                self.stack.push(Frame::Array {
                    items: items.clone(),
                    next: 0,
                });
                Ok(true)
            }
            Node::Object(entries) => {
                self.formatter.begin_object(&mut *self.writer)?;
                self.stack.push(Frame::Object {
                    entries: entries.clone(),
                    next: 0,
                    written: false,
                });
                Ok(true)
            }
            Node::Undefined | Node::Null => {
                self.formatter.write_null(&mut *self.writer)?;
                Ok(false)
            }
            Node::Bool(b) => {
                self.formatter.write_bool(&mut *self.writer, *b)?;
                Ok(false)
            }
            Node::Number(n) => {
                serde_json::to_writer(&mut *self.writer, n).map_err(encoding_error)?;
                Ok(false)
            }
            Node::String(s) => {
                serde_json::to_writer(&mut *self.writer, s).map_err(encoding_error)?;
                Ok(false)
            }
        }
    }

    /// 一个子节点输出完毕，通知其所在的容器
    fn end_value(&mut self) -> StringifyResult<()> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => self.formatter.end_array_value(&mut *self.writer)?,
            Some(Frame::Object { .. }) => self.formatter.end_object_value(&mut *self.writer)?,
            None => {}
        }
        Ok(())
    }
}

// serde_json 把输出目标的错误包装在自身的错误类型里，这里还原为 I/O 错误
fn encoding_error(e: serde_json::Error) -> StringifyError {
    if e.is_io() {
        StringifyError::Io(e.into())
    } else {
        StringifyError::Encoding(e)
    }
}
