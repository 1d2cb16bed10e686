use join_api::JoinContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) join: JoinContext,
}
