pub extern crate facet_geom;
pub extern crate facet_tessellation;

pub use facet_geom as geom;
pub use facet_tessellation as tessellation;
pub use facet_tessellation::*;
