pub mod db_cursor;
pub mod favorite;
pub mod image;
pub mod notification;
pub mod remote_keys;
