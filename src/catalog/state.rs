//! Display-ready view state of the catalog.

/// What the presentation layer should show
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T, E> {
  /// Nothing has been requested yet
  Idle,
  /// First page is being fetched and there is nothing to show
  Loading,
  /// Content is available
  Success(T),
  /// Nothing to show and the last fetch failed
  Failed(E),
}

impl<T, E> ViewState<T, E> {
  pub fn is_idle(&self) -> bool {
    matches!(self, ViewState::Idle)
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, ViewState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, ViewState::Success(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, ViewState::Failed(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      ViewState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&E> {
    match self {
      ViewState::Failed(e) => Some(e),
      _ => None,
    }
  }
}
