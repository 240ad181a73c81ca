//! Record storage service.
//!
//! [`StorageService`] turns typed records into backend calls and backend
//! failures into [`WalletError`](crate::error::WalletError)s:
//!
//! | Operation      | Backend call     | Failure on          |
//! |----------------|------------------|---------------------|
//! | `save`         | `add_record`     | duplicate `(type, id)` |
//! | `update`       | `update_record`  | missing `(type, id)`   |
//! | `delete`       | `delete_record`  | missing `(type, id)`   |
//! | `get_by_id`    | `get_record`     | missing `(type, id)`   |
//! | `get_all`      | `find_records`   | —                      |
//! | `find_by_query`| `find_records`   | —                      |

pub mod service;

pub use service::StorageService;
