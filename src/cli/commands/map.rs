use std::path::Path;

use super::CommandHandler;
use crate::io::OrchestrationPaths;
use crate::trace::SpatialMap;
use crate::Result;

/// Handler for the `map` command
pub struct MapCommand {
    pub workspace: String,
}

impl CommandHandler for MapCommand {
    async fn execute(&self) -> Result<()> {
        let paths = OrchestrationPaths::for_workspace(Path::new(&self.workspace));
        let mut map = SpatialMap::new(paths.spatial_map_file());
        let entries = map.load().await?;

        let target = paths.intent_map_file();
        map.write_markdown(&target).await?;

        println!(
            "Wrote {} ({} entr{})",
            target.display(),
            entries,
            if entries == 1 { "y" } else { "ies" }
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

impl MapCommand {
    pub fn new(workspace: String) -> Self {
        Self { workspace }
    }
}
