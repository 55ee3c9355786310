use crate::internal::Sealed;

macro_rules! markers {
  { $( $ident:ident, )* } => {$(
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct $ident;
    impl Sealed for $ident {}
    impl Marker for $ident {}
  )*};
}

markers! {
  AnyMarker,
  UserMarker,
  CycleMarker,
  ActivityMarker,
}

/// Restricts which unit types may be used as the generic tag
/// of an [`Id`](super::Id).
pub trait Marker: Sealed {}
