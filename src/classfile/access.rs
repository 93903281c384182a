//! Access and property flags.

use bitflags::bitflags;

bitflags! {
    /// Access and property flags of classes, fields, methods, parameters and inner class
    /// entries.
    ///
    /// The class file format reuses bit positions across declaration kinds, so several
    /// constants share a value: `SUPER` and `SYNCHRONIZED`, `VOLATILE` and `BRIDGE`,
    /// `TRANSIENT` and `VARARGS`, `MANDATED` and `MODULE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u16 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible to the declaring class only
        const PRIVATE = 0x0002;
        /// Visible to subclasses and the package
        const PROTECTED = 0x0004;
        /// Static member or nested class
        const STATIC = 0x0008;
        /// No subclasses, no overrides, no reassignment
        const FINAL = 0x0010;
        /// Class flag treating superclass methods specially on `invokespecial`
        const SUPER = 0x0020;
        /// Method invocation is wrapped by a monitor
        const SYNCHRONIZED = 0x0020;
        /// Field cannot be cached
        const VOLATILE = 0x0040;
        /// Bridge method generated by the compiler
        const BRIDGE = 0x0040;
        /// Field is not serialized
        const TRANSIENT = 0x0080;
        /// Method takes a variable number of arguments
        const VARARGS = 0x0080;
        /// Method is implemented natively
        const NATIVE = 0x0100;
        /// Type is an interface
        const INTERFACE = 0x0200;
        /// Type or method is abstract
        const ABSTRACT = 0x0400;
        /// Strict floating point semantics
        const STRICT = 0x0800;
        /// Not present in source code
        const SYNTHETIC = 0x1000;
        /// Type is an annotation interface
        const ANNOTATION = 0x2000;
        /// Type or field is an enumeration (constant)
        const ENUM = 0x4000;
        /// Parameter was implicitly declared
        const MANDATED = 0x8000;
        /// Type is a module descriptor
        const MODULE = 0x8000;
    }
}

impl AccessFlags {
    /// Flags that control visibility.
    pub const VISIBILITY: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED);

    /// Returns true if the `PUBLIC` flag is set.
    #[must_use]
    pub fn is_public(self) -> bool {
        self.contains(AccessFlags::PUBLIC)
    }

    /// Returns true if the `STATIC` flag is set.
    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Returns true if the `FINAL` flag is set.
    #[must_use]
    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    /// Returns true if the `ABSTRACT` flag is set.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    /// Returns true if the `SYNTHETIC` flag is set.
    #[must_use]
    pub fn is_synthetic(self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_bits() {
        assert_eq!(AccessFlags::SUPER.bits(), AccessFlags::SYNCHRONIZED.bits());
        assert_eq!(AccessFlags::BRIDGE, AccessFlags::VOLATILE);
        assert_eq!(AccessFlags::from_bits_truncate(0x0421), {
            AccessFlags::PUBLIC | AccessFlags::SUPER | AccessFlags::ABSTRACT
        });
    }

    #[test]
    fn visibility() {
        let flags = AccessFlags::PROTECTED | AccessFlags::STATIC | AccessFlags::FINAL;
        assert_eq!(flags & AccessFlags::VISIBILITY, AccessFlags::PROTECTED);
        assert!(flags.is_static());
        assert!(!flags.is_public());
    }
}
