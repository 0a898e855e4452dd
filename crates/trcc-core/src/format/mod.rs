//! Binary Format I/O (L6): the `Theme.zt` animation container and the
//! `.tr` theme archive.

pub mod theme_zt;
pub mod tr_archive;
