use alloc::vec::Vec;
use core::cell::RefCell;

use crate::decl::Declaration;
use crate::info::{Storage, TypeDesc, TypeInfo, ValueOps};
use crate::registry::TypeRegistry;

std::thread_local! {
    /// Records whose fill is running on this thread, innermost last.
    static FILLING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

#[inline]
fn address(info: &TypeInfo) -> usize {
    core::ptr::from_ref(info) as usize
}

fn is_filling_here(info: &TypeInfo) -> bool {
    let address = address(info);
    FILLING.with_borrow(|stack| stack.contains(&address))
}

// -----------------------------------------------------------------------------
// FillGuard

/// Marks a record as filling on this thread, and as filled when dropped,
/// including during unwinding.
struct FillGuard {
    info: &'static TypeInfo,
}

impl FillGuard {
    fn new(info: &'static TypeInfo) -> Self {
        FILLING.with_borrow_mut(|stack| stack.push(address(info)));
        Self { info }
    }
}

impl Drop for FillGuard {
    fn drop(&mut self) {
        let address = address(self.info);
        FILLING.with_borrow_mut(|stack| {
            if let Some(index) = stack.iter().rposition(|a| *a == address) {
                stack.remove(index);
            }
        });
        self.info.mark_filled();
        if std::thread::panicking() {
            log::error!("filling `{}` panicked, the record is incomplete", self.info.name());
        }
    }
}

// -----------------------------------------------------------------------------
// ensure_filled

/// Makes sure `info` is filled before it is handed out.
///
/// The first caller fills the record. A reentrant call from the same thread,
/// made while the fill is running, returns at once with the partially filled
/// record. Other threads wait for the fill to finish.
pub(super) fn ensure_filled(registry: &'static TypeRegistry, info: &'static TypeInfo) {
    if info.is_filled() {
        return;
    }

    if info.claim_fill() {
        let _guard = FillGuard::new(info);
        fill(registry, info);
        return;
    }

    if is_filling_here(info) {
        return;
    }

    while !info.is_filled() {
        std::thread::yield_now();
    }
}

// -----------------------------------------------------------------------------
// fill

/// Fills every part of a record, in a fixed order: the next unqualified
/// record, the storage, the class facts with their attributes, then the
/// modules in set order.
fn fill(registry: &'static TypeRegistry, info: &'static TypeInfo) {
    log::trace!("filling `{}`", info.name());

    let desc = info.desc();
    let next = if desc.is_qualified() {
        registry.get_or_create(desc.next_unqualified())
    } else {
        info
    };
    info.set_next_unqualified(next);

    let declaration = desc.value_base().map(|base| base.declaration());
    info.set_storage(storage_of(desc, declaration.as_ref(), next));

    // Attribute values are moved into their records only now, so that a
    // class may carry values of its own type.
    if let Some(class) = declaration.and_then(|d| d.into_class(registry)) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        validate(info, &class);
        info.set_class_decl(class);
    }

    let class = info.class_decl();
    let modules = info.module_set();
    for index in 0..modules.len() {
        if let Some(module) = modules.fill(index, info, class) {
            info.set_module(index, module);
        }
    }
}

fn storage_of(
    desc: &TypeDesc,
    declaration: Option<&Declaration>,
    next: &'static TypeInfo,
) -> Storage {
    match desc {
        TypeDesc::Reference(..) => Storage::Opaque,
        TypeDesc::Array(_, len) => Storage::Array {
            element: next,
            len: *len,
        },
        _ if desc.is_pointer() => Storage::Value(ValueOps::pointer()),
        _ => match declaration {
            Some(declaration) => Storage::Value(declaration.ops),
            None => Storage::Opaque,
        },
    }
}

/// Reports suspicious class facts.
#[cfg(all(debug_assertions, feature = "debug"))]
fn validate(info: &TypeInfo, class: &crate::decl::ClassDecl) {
    if class.reflected && class.members.is_empty() && class.base.is_none() {
        log::debug!("`{}` is a reflected class without members", info.name());
    }
    for member in &class.members {
        if member.name.is_empty() {
            log::warn!("`{}` has a member with an empty name", info.name());
        }
    }
}
