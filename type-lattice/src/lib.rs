//! Typed planning domains declare a forest of simple types under the
//! root `object`, and refer to ad hoc unions of these types with
//! `(either ...)`.  Every atom construction asks whether an argument's
//! type fits a predicate parameter, so the subtype relation must be
//! cheap to query.  We materialise its transitive closure, and extend
//! it incrementally as supertype edges are declared.
//!
//! Types are opaque `Copy` handles into the `TypeLattice` that created
//! them; a handle is meaningless for any other lattice.
mod closure;
mod error;

pub use error::LatticeError;

use closure::Closure;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Name of the root type, a supertype of every other type.
pub const OBJECT_NAME: &str = "object";

/// A handle to a simple or union type in a `TypeLattice`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Type(u32);

impl Type {
    /// The root type.  Every lattice declares it first.
    pub const OBJECT: Type = Type(0);

    #[inline]
    #[must_use]
    pub fn is_object(self) -> bool {
        self == Self::OBJECT
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Simple {
        name: String,
        /// Most general supertype declared so far, if any.
        supertype: Option<Type>,
    },
    /// Sorted, deduplicated, and always at least two simple types.
    Union { components: Vec<Type> },
}

/// A `TypeLattice` owns the declared simple types, the union types
/// built from them, and the subtype closure among simple types.
///
/// Types are never removed.  The relation is reflexive and transitive
/// at every observable point, and `add_supertype` refuses edges that
/// would introduce a cycle.
#[derive(Clone, Debug)]
pub struct TypeLattice {
    entries: Vec<Entry>,
    names: IndexMap<String, Type>,
    unions: FxHashMap<Vec<Type>, Type>,
    closure: Closure,
}

impl TypeLattice {
    /// Returns a lattice that only knows about `object`.
    #[must_use]
    pub fn new() -> Self {
        let mut names = IndexMap::new();
        names.insert(OBJECT_NAME.to_string(), Type::OBJECT);

        let mut closure = Closure::new();
        closure.grow(1);

        Self {
            entries: vec![Entry::Simple {
                name: OBJECT_NAME.to_string(),
                supertype: None,
            }],
            names,
            unions: FxHashMap::default(),
            closure,
        }
    }

    /// Interns a simple type called `name`.  Re-declaring a known name
    /// is a no-op that returns the existing type.
    pub fn add_type(&mut self, name: &str) -> Type {
        if let Some(ty) = self.names.get(name) {
            return *ty;
        }

        let ty = self.push(Entry::Simple {
            name: name.to_string(),
            supertype: None,
        });
        self.names.insert(name.to_string(), ty);
        debug!(name, "declared type");
        ty
    }

    /// Returns the simple type called `name`, if it was declared.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<Type> {
        self.names.get(name).copied()
    }

    /// Returns the type whose values are those of any type in `types`.
    ///
    /// Nested unions are flattened, a single component collapses to
    /// that component, and a union that includes `object` is `object`.
    /// Structurally equal unions share the same handle.
    ///
    /// # Errors
    ///
    /// Returns `Err` when `types` is empty.
    pub fn union_type<I>(&mut self, types: I) -> Result<Type, LatticeError>
    where
        I: IntoIterator<Item = Type>,
    {
        let mut components = BTreeSet::new();
        for ty in types {
            match &self.entries[ty.index()] {
                Entry::Simple { .. } => {
                    components.insert(ty);
                }
                Entry::Union { components: inner } => components.extend(inner.iter().copied()),
            }
        }

        if components.contains(&Type::OBJECT) {
            return Ok(Type::OBJECT);
        }

        let key: Vec<Type> = components.into_iter().collect();
        match key.len() {
            0 => Err(LatticeError::EmptyUnion),
            1 => Ok(key[0]),
            _ => {
                if let Some(ty) = self.unions.get(&key) {
                    return Ok(*ty);
                }

                let ty = self.push(Entry::Union {
                    components: key.clone(),
                });
                self.unions.insert(key, ty);
                Ok(ty)
            }
        }
    }

    /// Records that `sup` is a supertype of `sub`.
    ///
    /// Returns false, without changing anything, when `sup` is already
    /// a subtype of `sub` (the edge would close a cycle).  Unions on
    /// either side are handled component-wise, and the whole set of
    /// component edges is checked before anything is mutated: a
    /// component below both sides would end up above the other shared
    /// components too.
    pub fn add_supertype(&mut self, sub: Type, sup: Type) -> bool {
        if self.subtype(sub, sup) {
            return true;
        }

        if self.is_union(sub) || self.is_union(sup) {
            let lower = self.components(sub);
            let upper = self.components(sup);

            let acyclic = lower.iter().all(|&l| {
                upper.iter().all(|&u| {
                    l == u
                        || self.subtype(l, u)
                        || (!self.subtype(u, l)
                            && !(lower.contains(&u) && upper.contains(&l)))
                })
            });
            if !acyclic {
                debug!(?sub, ?sup, "rejected cyclic union supertype");
                return false;
            }

            for &l in &lower {
                for &u in &upper {
                    if l != u {
                        let added = self.add_supertype(l, u);
                        debug_assert!(added);
                    }
                }
            }

            return true;
        }

        if self.subtype(sup, sub) {
            debug!(?sub, ?sup, "rejected cyclic supertype");
            return false;
        }

        let added = self.closure.insert(sub.index(), sup.index());
        debug!(?sub, ?sup, added, "extended subtype closure");

        let replace = match self.supertype(sub) {
            None => true,
            Some(current) => self.subtype(current, sup),
        };
        if replace {
            if let Entry::Simple { supertype, .. } = &mut self.entries[sub.index()] {
                *supertype = Some(sup);
            }
        }

        true
    }

    /// Returns true iff every value of `sub` is a value of `sup`.
    #[must_use]
    pub fn subtype(&self, sub: Type, sup: Type) -> bool {
        if sub == sup {
            return true;
        }

        if sub.is_object() {
            return false;
        }

        if sup.is_object() {
            return true;
        }

        if let Some(components) = self.union_components(sub) {
            return components.iter().all(|&c| self.subtype(c, sup));
        }

        if let Some(components) = self.union_components(sup) {
            return components.iter().any(|&c| self.subtype(sub, c));
        }

        self.closure.contains(sub.index(), sup.index())
    }

    /// Returns true iff one of `a` or `b` is a subtype of the other.
    #[must_use]
    pub fn compatible(&self, a: Type, b: Type) -> bool {
        self.subtype(a, b) || self.subtype(b, a)
    }

    /// Returns whichever of `a` and `b` is a subtype of the other, or
    /// `None` if they are incompatible.
    #[must_use]
    pub fn most_specific(&self, a: Type, b: Type) -> Option<Type> {
        if self.subtype(a, b) {
            Some(a)
        } else if self.subtype(b, a) {
            Some(b)
        } else {
            None
        }
    }

    /// Returns the most general supertype declared for the simple
    /// type `ty`.  Unions and `object` have none.
    #[must_use]
    pub fn supertype(&self, ty: Type) -> Option<Type> {
        match &self.entries[ty.index()] {
            Entry::Simple { supertype, .. } => *supertype,
            Entry::Union { .. } => None,
        }
    }

    /// Returns every declared strict supertype of the simple type `ty`,
    /// excluding `object`.
    #[must_use]
    pub fn supertypes(&self, ty: Type) -> BTreeSet<Type> {
        self.closure
            .above(ty.index())
            .map(|index| Type(index as u32))
            .collect()
    }

    /// Returns every declared strict subtype of the simple type `ty`.
    /// For `object`, that's every other simple type.
    #[must_use]
    pub fn subtypes(&self, ty: Type) -> BTreeSet<Type> {
        if ty.is_object() {
            return self.names.values().copied().filter(|t| !t.is_object()).collect();
        }

        self.closure
            .below(ty.index())
            .map(|index| Type(index as u32))
            .collect()
    }

    #[must_use]
    pub fn is_union(&self, ty: Type) -> bool {
        self.union_components(ty).is_some()
    }

    /// Returns the simple components of `ty`: the members of a union,
    /// or just `ty` itself.
    #[must_use]
    pub fn components(&self, ty: Type) -> Vec<Type> {
        match self.union_components(ty) {
            Some(components) => components.to_vec(),
            None => vec![ty],
        }
    }

    /// Returns the declared name of a simple type, or `None` for unions.
    #[must_use]
    pub fn name(&self, ty: Type) -> Option<&str> {
        match &self.entries[ty.index()] {
            Entry::Simple { name, .. } => Some(name),
            Entry::Union { .. } => None,
        }
    }

    /// Returns the number of types, simple and union, including
    /// `object`.
    #[allow(clippy::len_without_is_empty)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the declared simple types, in declaration order.
    pub fn simple_types(&self) -> impl Iterator<Item = (&str, Type)> + '_ {
        self.names.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Returns a `Display`able view of `ty`.
    #[must_use]
    pub fn display(&self, ty: Type) -> TypeDisplay<'_> {
        TypeDisplay { lattice: self, ty }
    }

    fn union_components(&self, ty: Type) -> Option<&[Type]> {
        match &self.entries[ty.index()] {
            Entry::Simple { .. } => None,
            Entry::Union { components } => Some(components),
        }
    }

    fn push(&mut self, entry: Entry) -> Type {
        use std::convert::TryFrom;

        let ty = Type(u32::try_from(self.entries.len()).expect("Too many types"));
        self.entries.push(entry);
        self.closure.grow(self.entries.len());
        ty
    }
}

impl Default for TypeLattice {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a simple type by name, and a union as `(either a b ...)`.
pub struct TypeDisplay<'a> {
    lattice: &'a TypeLattice,
    ty: Type,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lattice.entries[self.ty.index()] {
            Entry::Simple { name, .. } => write!(f, "{}", name),
            Entry::Union { components } => {
                write!(f, "(either")?;
                for component in components {
                    write!(f, " {}", self.lattice.display(*component))?;
                }
                write!(f, ")")
            }
        }
    }
}

#[test]
fn test_blocks_and_tables() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let table = lattice.add_type("table");

    assert!(!lattice.compatible(block, table));
    assert!(lattice.add_supertype(block, table));
    assert!(lattice.subtype(block, table));
    assert!(!lattice.subtype(table, block));
    assert_eq!(lattice.most_specific(block, table), Some(block));
    assert_eq!(lattice.most_specific(table, block), Some(block));
    assert_eq!(lattice.supertype(block), Some(table));
}

#[test]
fn test_redeclaration() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");

    assert_eq!(lattice.add_type("block"), block);
    assert_eq!(lattice.add_type(OBJECT_NAME), Type::OBJECT);
    assert_eq!(lattice.find_type("block"), Some(block));
    assert_eq!(lattice.find_type("table"), None);
    assert_eq!(lattice.name(block), Some("block"));
}

#[test]
fn test_object_is_top() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let either = lattice.union_type(vec![a, b]).expect("ok");

    for ty in &[a, b, either, Type::OBJECT] {
        assert!(lattice.subtype(*ty, Type::OBJECT));
    }

    assert!(!lattice.subtype(Type::OBJECT, a));
    assert!(!lattice.subtype(Type::OBJECT, either));

    // object can't acquire a supertype...
    assert!(!lattice.add_supertype(Type::OBJECT, a));
    // ... and declaring it as one is redundant.
    assert!(lattice.add_supertype(a, Type::OBJECT));
    assert_eq!(lattice.supertype(a), None);
}

#[test]
fn test_cycle_rejection() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let c = lattice.add_type("c");

    assert!(lattice.add_supertype(b, a));
    assert!(lattice.add_supertype(c, b));
    assert!(!lattice.add_supertype(a, b));
    assert!(!lattice.add_supertype(a, c));

    assert!(lattice.subtype(c, a));
    assert!(!lattice.subtype(a, b));
    assert!(!lattice.subtype(a, c));
}

#[test]
fn test_transitive_propagation() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let c = lattice.add_type("c");
    let d = lattice.add_type("d");

    // Build a < b and c < d separately, then join b < c.
    assert!(lattice.add_supertype(a, b));
    assert!(lattice.add_supertype(c, d));
    assert!(lattice.add_supertype(b, c));

    assert!(lattice.subtype(a, d));
    assert!(lattice.subtype(a, c));
    assert!(lattice.subtype(b, d));
    assert_eq!(
        lattice.supertypes(a),
        vec![b, c, d].into_iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(
        lattice.subtypes(d),
        vec![a, b, c].into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn test_union_simplification() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let c = lattice.add_type("c");

    assert_eq!(lattice.union_type(vec![]), Err(LatticeError::EmptyUnion));
    assert_eq!(lattice.union_type(vec![a]).expect("ok"), a);
    assert_eq!(lattice.union_type(vec![a, a]).expect("ok"), a);
    assert_eq!(
        lattice.union_type(vec![a, Type::OBJECT]).expect("ok"),
        Type::OBJECT
    );

    let ab = lattice.union_type(vec![a, b]).expect("ok");
    assert!(lattice.is_union(ab));
    assert_eq!(lattice.union_type(vec![b, a]).expect("ok"), ab);
    assert_eq!(lattice.components(ab), vec![a, b]);
    assert_eq!(lattice.name(ab), None);

    // Nested unions flatten.
    let abc = lattice.union_type(vec![ab, c]).expect("ok");
    assert_eq!(lattice.components(abc), vec![a, b, c]);
    assert_eq!(lattice.display(abc).to_string(), "(either a b c)");
}

#[test]
fn test_union_subtyping() {
    let mut lattice = TypeLattice::new();
    let block = lattice.add_type("block");
    let table = lattice.add_type("table");
    let ball = lattice.add_type("ball");
    let either = lattice.union_type(vec![block, table]).expect("ok");

    assert!(lattice.subtype(block, either));
    assert!(lattice.subtype(table, either));
    assert!(!lattice.subtype(ball, either));
    assert!(!lattice.subtype(either, block));

    let thing = lattice.add_type("thing");
    assert!(lattice.add_supertype(either, thing));
    assert!(lattice.subtype(either, thing));
    assert!(lattice.subtype(block, thing));
    assert!(!lattice.subtype(ball, thing));
}

#[test]
fn test_union_supertype() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let c = lattice.add_type("c");
    let bc = lattice.union_type(vec![b, c]).expect("ok");

    assert!(lattice.add_supertype(a, bc));
    assert!(lattice.subtype(a, b));
    assert!(lattice.subtype(a, c));

    // b < a would close a cycle through the union; nothing changes.
    let d = lattice.add_type("d");
    let bd = lattice.union_type(vec![b, d]).expect("ok");
    assert!(!lattice.add_supertype(bd, a));
    assert!(!lattice.subtype(d, a));
}

#[test]
fn test_overlapping_union_supertype() {
    let mut lattice = TypeLattice::new();
    let a = lattice.add_type("a");
    let b = lattice.add_type("b");
    let x = lattice.add_type("x");
    let y = lattice.add_type("y");
    let abx = lattice.union_type(vec![a, b, x]).expect("ok");
    let aby = lattice.union_type(vec![a, b, y]).expect("ok");

    // a < b and b < a would both follow; nothing changes.
    assert!(!lattice.add_supertype(abx, aby));
    assert!(!lattice.compatible(a, b));
    assert!(!lattice.subtype(x, y));
    assert!(!lattice.subtype(x, a));

    // A single shared component only adds edges through it.
    let ax = lattice.union_type(vec![a, x]).expect("ok");
    let ay = lattice.union_type(vec![a, y]).expect("ok");
    assert!(lattice.add_supertype(ax, ay));
    assert!(lattice.subtype(x, a));
    assert!(lattice.subtype(a, y));
    assert!(lattice.subtype(x, y));
    assert!(lattice.subtype(ax, ay));

    // Already a subtype: nothing to check.
    let axy = lattice.union_type(vec![a, x, y]).expect("ok");
    assert!(lattice.add_supertype(ax, axy));
    assert!(lattice.add_supertype(y, axy));
}
