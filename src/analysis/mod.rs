/// Record analysis for the rowgroup utility.
///
/// Submodules:
/// - `groupings` — hierarchical group-by over a key path, plus flattening.

pub mod groupings;
