/// A native module built from a project descriptor by the build driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Path of the module sources, relative to the source tree
    pub sourcedir: String,
    /// Optional extra segment between `sourcedir` and the build output
    pub bindir: Option<String>,
    /// Build configuration name, e.g. `Release`
    pub build: String,
    /// Base name of the produced library
    pub projname: String,
    /// Base name of the project descriptor handed to the build driver
    pub vcproj: String,
}

impl Module {
    pub fn new(
        sourcedir: impl Into<String>,
        build: impl Into<String>,
        projname: impl Into<String>,
        vcproj: impl Into<String>,
    ) -> Self {
        Self {
            sourcedir: sourcedir.into(),
            bindir: None,
            build: build.into(),
            projname: projname.into(),
            vcproj: vcproj.into(),
        }
    }

    pub fn with_bindir(mut self, bindir: impl Into<String>) -> Self {
        self.bindir = Some(bindir.into());
        self
    }
}
