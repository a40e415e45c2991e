pub(super) mod branch;
pub(super) mod family;
