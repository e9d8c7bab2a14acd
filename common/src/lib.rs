pub mod packet;
pub mod req;
