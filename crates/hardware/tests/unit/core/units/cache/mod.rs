
/// Address decomposition.
pub mod geometry;


/// Write-back, write-allocate L2.
pub mod l2;
