// Domain layer: lead and CRM record models, import policy, and the CRM port.

pub mod model;
pub mod policy;
pub mod ports;
