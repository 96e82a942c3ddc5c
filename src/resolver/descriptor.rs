//! Member descriptors and the builder host code registers classes with.

use std::{
    any::Any,
    cell::{Ref, RefMut},
    fmt,
    sync::Arc,
};

use crate::{
    types::{ClassName, TypeRef},
    value::Value,
};

pub type MethodBody = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, HostError> + Send + Sync>;
pub type FieldGetter = Arc<dyn Fn(&Value) -> Result<Value, HostError> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&Value, Value) -> Result<(), HostError> + Send + Sync>;

/// Error raised by a host-registered member.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HostError {
    fn from(message: String) -> Self {
        HostError::new(message)
    }
}

impl From<&str> for HostError {
    fn from(message: &str) -> Self {
        HostError::new(message)
    }
}

/// Borrows the receiver of a host method as `T`.
pub fn receiver<T: Any>(this: &Value) -> Result<Ref<'_, T>, HostError> {
    match this {
        Value::Object(object) => object.borrow::<T>(),
        other => Err(HostError::new(format!(
            "expected a host object receiver, got {}",
            other.class_name()
        ))),
    }
}

/// Mutably borrows the receiver of a host method as `T`.
pub fn receiver_mut<T: Any>(this: &Value) -> Result<RefMut<'_, T>, HostError> {
    match this {
        Value::Object(object) => object.borrow_mut::<T>(),
        other => Err(HostError::new(format!(
            "expected a host object receiver, got {}",
            other.class_name()
        ))),
    }
}

/// A callable member: instance method, static method or constructor.
pub struct MethodDescriptor {
    pub name: Arc<str>,
    pub declaring_class: ClassName,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    /// The last parameter is an array type that absorbs trailing arguments.
    pub variadic: bool,
    pub is_static: bool,
    body: MethodBody,
}

impl MethodDescriptor {
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value, HostError> {
        (self.body)(receiver, args)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether `count` arguments can be passed, packing extras into the variadic tail.
    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.variadic {
            count + 1 >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// Same name and parameter list; declaring class is irrelevant.
    pub fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.variadic == other.variadic
            && self.is_static == other.is_static
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        let mut rendered = params.join(", ");
        if self.variadic {
            rendered.push_str("...");
        }
        format!("{}.{}({})", self.declaring_class, self.name, rendered)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.signature(), self.returns)
    }
}

/// A field: read through its getter closure, optionally written through its setter.
pub struct FieldDescriptor {
    pub name: Arc<str>,
    pub declaring_class: ClassName,
    pub ty: TypeRef,
    pub is_static: bool,
    getter: FieldGetter,
    setter: Option<FieldSetter>,
}

impl FieldDescriptor {
    pub fn get(&self, target: &Value) -> Result<Value, HostError> {
        (self.getter)(target)
    }

    pub fn set(&self, target: &Value, value: Value) -> Result<(), HostError> {
        match &self.setter {
            Some(setter) => setter(target, value),
            None => Err(HostError::new(format!(
                "field {}.{} is read-only",
                self.declaring_class, self.name
            ))),
        }
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.ty, self.declaring_class, self.name)
    }
}

/// Everything registered for one class or interface. Members are the declared
/// ones only; inheritance is applied by the resolver.
#[derive(Debug)]
pub struct ClassDescriptor {
    pub name: ClassName,
    pub superclass: Option<ClassName>,
    pub interfaces: Vec<ClassName>,
    pub is_interface: bool,
    pub methods: Vec<Arc<MethodDescriptor>>,
    pub constructors: Vec<Arc<MethodDescriptor>>,
    pub fields: Vec<Arc<FieldDescriptor>>,
}

/// Fluent registration of a host class.
///
/// # Examples
///
/// ```
/// use graphnav_lang::resolver::{ClassBuilder, receiver};
/// use graphnav_lang::{TypeRef, Value};
///
/// struct Point { x: i32 }
///
/// let class = ClassBuilder::new("Point")
///     .method("getX", vec![], TypeRef::int(), |this, _| {
///         Ok(Value::Int(receiver::<Point>(this)?.x))
///     })
///     .build();
/// assert_eq!(class.methods.len(), 1);
/// ```
pub struct ClassBuilder {
    class: ClassDescriptor,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            class: ClassDescriptor {
                name: Arc::from(name),
                superclass: None,
                interfaces: Vec::new(),
                is_interface: false,
                methods: Vec::new(),
                constructors: Vec::new(),
                fields: Vec::new(),
            },
        }
    }

    pub fn interface(name: &str) -> Self {
        let mut builder = ClassBuilder::new(name);
        builder.class.is_interface = true;
        builder
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.class.superclass = Some(Arc::from(parent));
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.class.interfaces.push(Arc::from(interface));
        self
    }

    fn push_method(
        mut self,
        name: &str,
        params: Vec<TypeRef>,
        returns: TypeRef,
        variadic: bool,
        is_static: bool,
        body: MethodBody,
    ) -> Self {
        self.class.methods.push(Arc::new(MethodDescriptor {
            name: Arc::from(name),
            declaring_class: self.class.name.clone(),
            params,
            returns,
            variadic,
            is_static,
            body,
        }));
        self
    }

    pub fn method<F>(self, name: &str, params: Vec<TypeRef>, returns: TypeRef, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.push_method(name, params, returns, false, false, Arc::new(body))
    }

    /// Registers a method whose last parameter (an array type) collects any
    /// trailing arguments.
    pub fn variadic_method<F>(
        self,
        name: &str,
        params: Vec<TypeRef>,
        returns: TypeRef,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.push_method(name, params, returns, true, false, Arc::new(body))
    }

    pub fn static_method<F>(self, name: &str, params: Vec<TypeRef>, returns: TypeRef, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.push_method(
            name,
            params,
            returns,
            false,
            true,
            Arc::new(move |_: &Value, args: &[Value]| body(args)),
        )
    }

    pub fn constructor<F>(mut self, params: Vec<TypeRef>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        let returns = TypeRef::Class(self.class.name.clone());
        self.class.constructors.push(Arc::new(MethodDescriptor {
            name: Arc::from("<init>"),
            declaring_class: self.class.name.clone(),
            params,
            returns,
            variadic: false,
            is_static: true,
            body: Arc::new(move |_: &Value, args: &[Value]| body(args)),
        }));
        self
    }

    fn push_field(
        mut self,
        name: &str,
        ty: TypeRef,
        is_static: bool,
        getter: FieldGetter,
        setter: Option<FieldSetter>,
    ) -> Self {
        self.class.fields.push(Arc::new(FieldDescriptor {
            name: Arc::from(name),
            declaring_class: self.class.name.clone(),
            ty,
            is_static,
            getter,
            setter,
        }));
        self
    }

    pub fn field<G>(self, name: &str, ty: TypeRef, getter: G) -> Self
    where
        G: Fn(&Value) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.push_field(name, ty, false, Arc::new(getter), None)
    }

    pub fn mutable_field<G, S>(self, name: &str, ty: TypeRef, getter: G, setter: S) -> Self
    where
        G: Fn(&Value) -> Result<Value, HostError> + Send + Sync + 'static,
        S: Fn(&Value, Value) -> Result<(), HostError> + Send + Sync + 'static,
    {
        self.push_field(name, ty, false, Arc::new(getter), Some(Arc::new(setter)))
    }

    pub fn static_field<G>(self, name: &str, ty: TypeRef, value: G) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
    {
        self.push_field(name, ty, true, Arc::new(move |_: &Value| Ok(value())), None)
    }

    pub fn build(self) -> ClassDescriptor {
        self.class
    }
}
