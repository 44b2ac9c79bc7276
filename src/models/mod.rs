pub mod staff;
pub mod exam;
pub mod student;
pub mod room;
pub mod menu;
pub mod order;
pub mod table;
pub mod printer;

pub use staff::Staff;
pub use exam::Exam;
pub use student::Student;
pub use room::{Room, Seat};
pub use menu::{MenuGroup, MenuItem};
pub use order::{Order, OrderItem};
pub use table::DiningTable;
pub use printer::Printer;
