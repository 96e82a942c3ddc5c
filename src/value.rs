use std::{
    any::{Any, type_name},
    cell::{Ref, RefCell, RefMut},
    collections::HashMap,
    fmt,
    rc::Rc,
    sync::Arc,
};

use rust_decimal::Decimal;

use crate::{
    resolver::HostError,
    types::{ClassName, Primitive, TypeRef},
};

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type SetRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<HashMap<String, Value>>>;
pub type ArrayRef = Rc<RefCell<ArrayData>>;
pub type IteratorRef = Rc<RefCell<IteratorState>>;

/// Longest array or list an expression can allocate.
pub const MAX_LENGTH: i64 = i32::MAX as i64;

/// An empty buffer with room for `len` values, or a message saying why it
/// cannot be allocated.
pub(crate) fn reserve(len: i64) -> Result<Vec<Value>, String> {
    let Some(capacity) = usize::try_from(len).ok().filter(|_| len <= MAX_LENGTH) else {
        return Err(format!("invalid length {}", len));
    };
    let mut items = Vec::new();
    items
        .try_reserve_exact(capacity)
        .map_err(|e| format!("cannot allocate {} elements: {}", len, e))?;
    Ok(items)
}

/// `len` copies of `fill`, under the same limits as [`reserve`].
pub(crate) fn filled(len: i64, fill: Value) -> Result<Vec<Value>, String> {
    let mut items = reserve(len)?;
    items.resize(len as usize, fill);
    Ok(items)
}

/// A value flowing through expression evaluation.
///
/// Scalars are stored inline. Collections and host objects are shared,
/// interior-mutable references: navigating to `bean.items` and then assigning
/// `[0]` mutates the list the bean holds.
///
/// # Examples
///
/// ```
/// use graphnav_lang::Value;
///
/// let items = Value::list(vec![Value::Int(1), Value::Int(2)]);
/// let alias = items.clone();
/// if let Value::List(list) = &alias {
///     list.borrow_mut().push(Value::Int(3));
/// }
/// assert_eq!(items, Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Arbitrary-precision integers are bounded to 128 bits; overflow is an
    /// arithmetic error rather than wrapping.
    BigInteger(i128),
    BigDecimal(Decimal),
    String(String),
    List(ListRef),
    Array(ArrayRef),
    /// String-keyed map; non-string keys are stored under their display form.
    Map(MapRef),
    /// Insertion-ordered set of structurally distinct values.
    Set(SetRef),
    Iterator(IteratorRef),
    Object(ObjectRef),
    /// A symbolic index resolved against a collection's size when used.
    Subscript(DynamicSubscript),
}

/// Symbolic collection index, resolved at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicSubscript {
    First,
    Mid,
    Last,
    All,
}

impl DynamicSubscript {
    /// Resolves the subscript against a collection length. `None` for an empty
    /// collection and for [`DynamicSubscript::All`].
    pub fn resolve(self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            DynamicSubscript::First => Some(0),
            DynamicSubscript::Mid => Some(len / 2),
            DynamicSubscript::Last => Some(len - 1),
            DynamicSubscript::All => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DynamicSubscript::First => "FIRST",
            DynamicSubscript::Mid => "MID",
            DynamicSubscript::Last => "LAST",
            DynamicSubscript::All => "ALL",
        }
    }
}

/// Backing storage of an array value: a fixed component type plus elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    pub component: TypeRef,
    pub items: Vec<Value>,
}

/// Cursor over a snapshot of collection elements.
#[derive(Debug, Clone, PartialEq)]
pub struct IteratorState {
    pub items: Vec<Value>,
    pub position: usize,
}

impl IteratorState {
    pub fn has_next(&self) -> bool {
        self.position < self.items.len()
    }

    pub fn next_item(&mut self) -> Option<Value> {
        let item = self.items.get(self.position).cloned()?;
        self.position += 1;
        Some(item)
    }
}

/// A host object: any `'static` Rust value tagged with the name of the class
/// its members are registered under.
#[derive(Clone)]
pub struct ObjectRef {
    class: ClassName,
    cell: Rc<RefCell<dyn Any>>,
}

impl ObjectRef {
    pub fn new<T: Any>(class: &str, value: T) -> Self {
        ObjectRef {
            class: Arc::from(class),
            cell: Rc::new(RefCell::new(value)),
        }
    }

    pub fn class_name(&self) -> &ClassName {
        &self.class
    }

    /// Borrows the object as `T`.
    pub fn borrow<T: Any>(&self) -> Result<Ref<'_, T>, HostError> {
        let cell = self
            .cell
            .try_borrow()
            .map_err(|_| HostError::new(format!("{} is already mutably borrowed", self.class)))?;
        Ref::filter_map(cell, |any| any.downcast_ref::<T>())
            .map_err(|_| HostError::new(format!("{} is not a {}", self.class, type_name::<T>())))
    }

    /// Mutably borrows the object as `T`.
    pub fn borrow_mut<T: Any>(&self) -> Result<RefMut<'_, T>, HostError> {
        let cell = self
            .cell
            .try_borrow_mut()
            .map_err(|_| HostError::new(format!("{} is already borrowed", self.class)))?;
        RefMut::filter_map(cell, |any| any.downcast_mut::<T>())
            .map_err(|_| HostError::new(format!("{} is not a {}", self.class, type_name::<T>())))
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.class, Rc::as_ptr(&self.cell) as *const ())
    }
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Builds a set, dropping structural duplicates while keeping first-seen order.
    pub fn set(items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|seen| seen.same(&item)) {
                unique.push(item);
            }
        }
        Value::Set(Rc::new(RefCell::new(unique)))
    }

    pub fn map(entries: HashMap<String, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn array(component: TypeRef, items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(ArrayData { component, items })))
    }

    pub fn iterator(items: Vec<Value>) -> Self {
        Value::Iterator(Rc::new(RefCell::new(IteratorState { items, position: 0 })))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn object<T: Any>(class: &str, value: T) -> Self {
        Value::Object(ObjectRef::new(class, value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by conditions, `!`, `&&`, `||` and selections.
    ///
    /// null, `false`, numeric zero of any tier and `'\0'` are false; everything
    /// else is true, including empty strings and empty collections.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::Byte(n) => *n != 0,
            Value::Short(n) => *n != 0,
            Value::Int(n) => *n != 0,
            Value::Long(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Double(n) => *n != 0.0,
            Value::BigInteger(n) => *n != 0,
            Value::BigDecimal(n) => !n.is_zero(),
            _ => true,
        }
    }

    /// Integer view of integral values, used for positional indexing.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            Value::BigInteger(n) => i64::try_from(*n).ok(),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Snapshot of the elements of a list, set or array.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items.borrow().clone()),
            Value::Array(array) => Some(array.borrow().items.clone()),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Set(_) | Value::Array(_))
    }

    /// Class name used for member and accessor lookup.
    pub fn class_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "Boolean",
            Value::Char(_) => "Character",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Int(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::BigInteger(_) => "BigInteger",
            Value::BigDecimal(_) => "BigDecimal",
            Value::String(_) => "String",
            Value::List(_) => "ArrayList",
            Value::Array(_) => "Array",
            Value::Map(_) => "HashMap",
            Value::Set(_) => "HashSet",
            Value::Iterator(_) => "Iterator",
            Value::Object(object) => object.class_name(),
            Value::Subscript(_) => "DynamicSubscript",
        }
    }

    /// Static type of the value as seen by overload scoring.
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Value::Boolean(_) => TypeRef::Primitive(Primitive::Boolean),
            Value::Char(_) => TypeRef::Primitive(Primitive::Char),
            Value::Byte(_) => TypeRef::Primitive(Primitive::Byte),
            Value::Short(_) => TypeRef::Primitive(Primitive::Short),
            Value::Int(_) => TypeRef::Primitive(Primitive::Int),
            Value::Long(_) => TypeRef::Primitive(Primitive::Long),
            Value::Float(_) => TypeRef::Primitive(Primitive::Float),
            Value::Double(_) => TypeRef::Primitive(Primitive::Double),
            Value::Array(array) => TypeRef::array_of(array.borrow().component.clone()),
            Value::Object(object) => TypeRef::Class(object.class_name().clone()),
            Value::Null => TypeRef::object(),
            other => TypeRef::class(other.class_name()),
        }
    }

    /// Default value stored in freshly allocated array slots of `component`.
    pub fn default_for(component: &TypeRef) -> Value {
        match component {
            TypeRef::Primitive(Primitive::Boolean) => Value::Boolean(false),
            TypeRef::Primitive(Primitive::Char) => Value::Char('\0'),
            TypeRef::Primitive(Primitive::Byte) => Value::Byte(0),
            TypeRef::Primitive(Primitive::Short) => Value::Short(0),
            TypeRef::Primitive(Primitive::Int) => Value::Int(0),
            TypeRef::Primitive(Primitive::Long) => Value::Long(0),
            TypeRef::Primitive(Primitive::Float) => Value::Float(0.0),
            TypeRef::Primitive(Primitive::Double) => Value::Double(0.0),
            _ => Value::Null,
        }
    }

    /// Equality that treats two references to the same shared collection as
    /// equal without comparing contents, so a collection that holds
    /// itself can be searched.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) if Rc::ptr_eq(a, b) => true,
            (Value::Map(a), Value::Map(b)) if Rc::ptr_eq(a, b) => true,
            (Value::Array(a), Value::Array(b)) if Rc::ptr_eq(a, b) => true,
            _ => self == other,
        }
    }

    /// Key under which this value is stored in a map.
    pub fn map_key(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

/// String form used by concatenation and `toString()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", format_float(f64::from(*n))),
            Value::Double(n) => write!(f, "{}", format_float(*n)),
            Value::BigInteger(n) => write!(f, "{}", n),
            Value::BigDecimal(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) | Value::Set(items) => write_joined(f, &items.borrow()),
            Value::Array(array) => write_joined(f, &array.borrow().items),
            Value::Map(map) => {
                let map = map.borrow();
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, map[*key])?;
                }
                write!(f, "}}")
            }
            Value::Iterator(_) => write!(f, "Iterator"),
            Value::Object(object) => write!(f, "{:?}", object),
            Value::Subscript(subscript) => write!(f, "#{}", subscript.keyword()),
        }
    }
}
