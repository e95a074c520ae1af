/// Handle supplied by the host platform. Nothing can construct it, so it
/// is always bound on the component.
#[derive(Debug)]
pub struct Context {
    package_name: String,
}

impl Context {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}
