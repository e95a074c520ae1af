use crate::platform::Context;
use crate::repository::{Repository1, Repository2};
use std::sync::Arc;
use tinydi::inject;

#[derive(Debug)]
pub struct MyViewModel {
    repo: Arc<Repository1>,
    repository2: Arc<Repository2>,
    context: Arc<Context>,
}

impl MyViewModel {
    #[inject]
    pub fn new(
        repo: Arc<Repository1>,
        repository2: Arc<Repository2>,
        context: Arc<Context>,
    ) -> Self {
        Self {
            repo,
            repository2,
            context,
        }
    }

    pub fn greeting(&self) -> String {
        format!("Hello {}!", self.context.package_name())
    }

    pub fn repo(&self) -> &Arc<Repository1> {
        &self.repo
    }

    pub fn repository2(&self) -> &Arc<Repository2> {
        &self.repository2
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }
}

include!(concat!(env!("OUT_DIR"), "/view_model/my_view_model_factory.rs"));
