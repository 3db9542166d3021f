use std::sync::Arc;

use seasonarr::SeasonReconciler;

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<SeasonReconciler>,
}
