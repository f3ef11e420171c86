pub mod dispatcher;
pub mod push_dispatch;
pub mod recipients;
pub mod supabase;

pub use dispatcher::{DeliveryFailure, FanOutDispatcher, PushGateway};
pub use push_dispatch::PushDispatchService;
pub use recipients::{RecipientResolver, TokenStore};
pub use supabase::SupabaseClient;
