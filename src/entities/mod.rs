mod coordinates;
mod notification;
mod position;
mod route;
mod session;
mod stop;

pub use coordinates::Coordinates;
pub use notification::{Notification, NotificationAction};
pub use position::{PositionSample, WatchOptions};
pub use route::{Route, RouteLeg, RouteStep};
pub use session::{NavigationSession, RerouteThrottle, SessionEvent};
pub use stop::Stop;
