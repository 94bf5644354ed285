pub mod attendance_record;
pub mod attendance_type;
pub mod device_binding;
pub mod employee;
pub mod staff_user;
