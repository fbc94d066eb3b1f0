//! Heap composites: objects, arrays, function values, and the
//! pre-resolved handle types attached to tree nodes.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ast::Ty;
use crate::errors::EvalResult;
use crate::value::heap::Heap;
use crate::value::Value;

type DynFn = dyn Fn(&[Value]) -> EvalResult + Send + Sync;
type DynMethod = dyn Fn(Option<&Value>, &[Value]) -> EvalResult + Send + Sync;

fn dyn_ptr_eq<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    // Compare data pointers only; vtable pointers may differ across
    // codegen units for the same closure.
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// A pre-resolved operator or constructor handle.
///
/// When present on a node it fully replaces the built-in rule for that
/// node; both operands (or all constructor arguments) are passed
/// positionally.
#[derive(Clone)]
pub struct NativeFn(Arc<DynFn>);

impl NativeFn {
    /// Wrap a closure as a handle.
    pub fn new(f: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static) -> Self {
        NativeFn(Arc::new(f))
    }

    /// Invoke the handle with positional arguments.
    pub fn invoke(&self, args: &[Value]) -> EvalResult {
        (self.0)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<native fn>")
    }
}

/// A pre-resolved method handle.
///
/// Invoked with the evaluated receiver (when the call node has one) and
/// the evaluated arguments, left to right.
#[derive(Clone)]
pub struct MethodFn(Arc<DynMethod>);

impl MethodFn {
    /// Wrap a closure as a method handle.
    pub fn new(
        f: impl Fn(Option<&Value>, &[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        MethodFn(Arc::new(f))
    }

    /// Invoke the handle.
    pub fn invoke(&self, receiver: Option<&Value>, args: &[Value]) -> EvalResult {
        (self.0)(receiver, args)
    }
}

impl fmt::Debug for MethodFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<method fn>")
    }
}

struct ObjectRepr {
    type_name: Arc<str>,
    fields: RwLock<FxHashMap<Arc<str>, Value>>,
}

/// A named object instance: a dynamic field map.
///
/// Compares by reference identity. Field mutation is scoped to a single
/// invocation's assignment nodes, guarded by `RwLock` so a stray shared
/// instance cannot race.
#[derive(Clone)]
pub struct ObjectValue(Heap<ObjectRepr>);

impl ObjectValue {
    pub(crate) fn new(type_name: &str) -> Self {
        ObjectValue(Heap::new(ObjectRepr {
            type_name: Arc::from(type_name),
            fields: RwLock::new(FxHashMap::default()),
        }))
    }

    /// The declared type name of this instance.
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// Read a named field, if set.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.0.fields.read().get(field).cloned()
    }

    /// Write a named field.
    pub fn set(&self, field: &str, value: Value) {
        self.0.fields.write().insert(Arc::from(field), value);
    }

    /// Number of set fields.
    pub fn field_count(&self) -> usize {
        self.0.fields.read().len()
    }

    /// Reference identity.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Heap::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_name", &self.type_name())
            .field("fields", &self.field_count())
            .finish()
    }
}

struct ArrayRepr {
    elem_ty: Ty,
    dims: Vec<usize>,
    elems: RwLock<Vec<Value>>,
}

/// An array value: element type, dimensions, and flat element storage.
///
/// Multi-dimensional arrays store their elements flattened in row-major
/// order; `len` is the total element count. Compares by reference
/// identity.
#[derive(Clone)]
pub struct ArrayValue(Heap<ArrayRepr>);

impl ArrayValue {
    pub(crate) fn new(elem_ty: Ty, dims: Vec<usize>, elems: Vec<Value>) -> Self {
        debug_assert_eq!(dims.iter().product::<usize>(), elems.len());
        ArrayValue(Heap::new(ArrayRepr {
            elem_ty,
            dims,
            elems: RwLock::new(elems),
        }))
    }

    /// The declared element type.
    pub fn elem_ty(&self) -> &Ty {
        &self.0.elem_ty
    }

    /// The dimension lengths.
    pub fn dims(&self) -> &[usize] {
        &self.0.dims
    }

    /// Total element count across all dimensions.
    pub fn len(&self) -> usize {
        self.0.elems.read().len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at a flat index.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.elems.read().get(index).cloned()
    }

    /// Write the element at a flat index. Returns `false` when the
    /// index is out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut elems = self.0.elems.write();
        match elems.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current elements, in flat order.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.elems.read().clone()
    }

    /// Reference identity.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Heap::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("elem_ty", &self.0.elem_ty)
            .field("dims", &self.0.dims)
            .finish()
    }
}

/// A first-class function value.
///
/// Produced by nested lambda nodes (wrapping the whole interpreter) and
/// invocable through delegate-invocation nodes. Compares by reference
/// identity.
#[derive(Clone)]
pub struct FunctionValue {
    arity: usize,
    fun: Arc<DynFn>,
}

impl FunctionValue {
    pub(crate) fn new(
        arity: usize,
        f: impl Fn(&[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        FunctionValue {
            arity,
            fun: Arc::new(f),
        }
    }

    /// Declared parameter count.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke with positional arguments.
    pub fn invoke(&self, args: &[Value]) -> EvalResult {
        (self.fun)(args)
    }

    /// Reference identity.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        dyn_ptr_eq(&a.fun, &b.fun)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn/{}>", self.arity)
    }
}
