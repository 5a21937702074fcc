//!
//! Builtins expanded inline at the call site: the runtime's atomic
//! primitives, branch hints and frame introspection.
//!

use cranelift::prelude::Type;

use super::BuiltinRegistry;
use crate::entry::InlineExpander;
use crate::expand::{atomics, expand_expect, expand_extract_return_addr, frame};
use crate::types::SignatureTypes;

impl BuiltinRegistry {
    pub(super) fn define_expr_builtins(&mut self) {
        self.define_runtime_atomics();

        let ptr = self.types.pointer_type();
        let i32_ = cranelift::prelude::types::I32;
        let i64_ = cranelift::prelude::types::I64;
        self.register_inlined(
            "__builtin_expect",
            smallvec::smallvec![i64_, i64_],
            Some(i64_),
            expand_expect,
        );
        self.register_inlined(
            "__builtin_extract_return_addr",
            smallvec::smallvec![ptr],
            Some(ptr),
            expand_extract_return_addr,
        );
        self.register_inlined(
            "__builtin_return_address",
            smallvec::smallvec![i32_],
            Some(ptr),
            frame::expand_return_address,
        );
        self.register_inlined(
            "__builtin_frame_address",
            smallvec::smallvec![i32_],
            Some(ptr),
            frame::expand_frame_address,
        );
    }

    fn define_runtime_atomics(&mut self) {
        use cranelift::prelude::types::{I8, I32, I64};

        let ptr = self.types.pointer_type();
        let bool_ = self.types.bool_type();
        let table: [(&str, SignatureTypes, Option<Type>, InlineExpander); 16] = [
            ("atomic::load8", smallvec::smallvec![ptr], Some(I8), atomics::expand_load8),
            ("atomic::load32", smallvec::smallvec![ptr], Some(I32), atomics::expand_load32),
            ("atomic::load64", smallvec::smallvec![ptr], Some(I64), atomics::expand_load64),
            ("atomic::load_ptr", smallvec::smallvec![ptr], Some(ptr), atomics::expand_load_ptr),
            ("atomic::store8", smallvec::smallvec![ptr, I8], None, atomics::expand_store),
            ("atomic::store32", smallvec::smallvec![ptr, I32], None, atomics::expand_store),
            ("atomic::store64", smallvec::smallvec![ptr, I64], None, atomics::expand_store),
            ("atomic::store_ptr", smallvec::smallvec![ptr, ptr], None, atomics::expand_store),
            ("atomic::xchg32", smallvec::smallvec![ptr, I32], Some(I32), atomics::expand_xchg),
            ("atomic::xchg64", smallvec::smallvec![ptr, I64], Some(I64), atomics::expand_xchg),
            ("atomic::xadd32", smallvec::smallvec![ptr, I32], Some(I32), atomics::expand_xadd),
            ("atomic::xadd64", smallvec::smallvec![ptr, I64], Some(I64), atomics::expand_xadd),
            ("atomic::cas32", smallvec::smallvec![ptr, I32, I32], Some(bool_), atomics::expand_cas),
            ("atomic::cas64", smallvec::smallvec![ptr, I64, I64], Some(bool_), atomics::expand_cas),
            ("atomic::and8", smallvec::smallvec![ptr, I8], None, atomics::expand_and),
            ("atomic::or8", smallvec::smallvec![ptr, I8], None, atomics::expand_or),
        ];
        for (name, params, result, expander) in table {
            self.register_inlined(name, params, result, expander);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::BuiltinRegistry;
    use crate::types::TypeManager;
    use cranelift::prelude::types;

    #[test]
    fn test_pointer_sized_atomics_follow_target() {
        let mut reg = BuiltinRegistry::new(TypeManager::new("i686-unknown-linux-gnu".parse().unwrap()));
        reg.register_all(false);
        let load = reg.lookup("atomic::load_ptr").unwrap();
        assert_eq!(load.signature_types(), &[types::I32]);
        assert_eq!(load.result_type(), Some(types::I32));
        let ra = reg.lookup("__builtin_return_address").unwrap();
        assert_eq!(ra.result_type(), Some(types::I32));
    }

    #[test]
    fn test_void_atomics_have_no_result() {
        let mut reg = BuiltinRegistry::new(TypeManager::host());
        reg.register_all(false);
        for name in ["atomic::store32", "atomic::and8", "atomic::or8"] {
            assert_eq!(reg.lookup(name).unwrap().result_type(), None, "{}", name);
        }
        assert_eq!(
            reg.lookup("atomic::cas64").unwrap().result_type(),
            Some(types::I8)
        );
    }
}
