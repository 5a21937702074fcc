//!
//! `__sync_fetch_and_add_N`: atomic add on an N-byte integer returning the
//! value held before the add.
//!

use super::BuiltinRegistry;
use crate::expand::atomics::expand_fetch_and_add;

const SYNC_WIDTHS: [u16; 4] = [1, 2, 4, 8];

impl BuiltinRegistry {
    pub(super) fn define_sync_fetch_and_add_builtins(&mut self) {
        let ptr = self.types.pointer_type();
        for bytes in SYNC_WIDTHS {
            let Some(ty) = self.types.int_of_bytes(bytes) else {
                continue;
            };
            self.register_inlined(
                &format!("__sync_fetch_and_add_{}", bytes),
                smallvec::smallvec![ptr, ty],
                Some(ty),
                expand_fetch_and_add,
            );
        }
    }
}
