pub mod scr;
pub mod sd_status;
pub mod switch_status;
