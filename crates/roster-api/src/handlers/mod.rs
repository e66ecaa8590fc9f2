//! Request handlers, one module per entity.
//!
//! Every entity exposes the same five routes:
//!
//! | Method   | Path            | Auth | Notes |
//! |----------|-----------------|------|-------|
//! | `GET`    | `/{entity}`     | no   | `?q=&meta_key=&meta_val=&page=` |
//! | `POST`   | `/{entity}`     | yes  | 201 on success |
//! | `GET`    | `/{entity}/{id}`| no   | detail view; 404 if missing |
//! | `PUT`    | `/{entity}/{id}`| yes  | full replace |
//! | `DELETE` | `/{entity}/{id}`| yes  | 204; 404 if missing |

pub mod courses;
pub mod enrollments;
pub mod instructors;
pub mod metadata;
pub mod students;
