use anyhow::Result;
use ferment::commands::batch::CreateArgs;
use ferment::commands::common::App;
use ferment::commands::{batch, dashboard, log, recipes, stage, watch};

use super::types::{BatchCommands, Commands, LogCommands, StageCommands};

pub fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Batch { command } => match command {
            BatchCommands::Create {
                name,
                product_type,
                start,
                notes,
                scan_code,
                weight,
                no_template,
            } => batch::create(
                app,
                CreateArgs {
                    name,
                    product_type,
                    start,
                    notes,
                    scan_code,
                    weight,
                    no_template,
                },
            )
            .map(|_| ()),
            BatchCommands::List { all, json } => batch::list(app, all, json),
            BatchCommands::Show { key, json } => batch::show(app, &key, json),
            BatchCommands::Finish { batch_id } => batch::finish(app, &batch_id),
            BatchCommands::Delete { batch_id, force } => batch::delete(app, &batch_id, force),
        },
        Commands::Stage { command } => match command {
            StageCommands::Start { stage_id } => stage::start(app, &stage_id).map(|_| ()),
            StageCommands::Complete { stage_id } => stage::complete(app, &stage_id).map(|_| ()),
            StageCommands::Remove { stage_id } => stage::remove(app, &stage_id),
            StageCommands::Append {
                batch_id,
                name,
                hours,
            } => stage::append(app, &batch_id, &name, hours),
        },
        Commands::Log { command } => match command {
            LogCommands::Weight {
                batch_id,
                grams,
                photo,
            } => log::weight(app, &batch_id, grams, photo),
            LogCommands::Photo { batch_id, path } => log::photo(app, &batch_id, &path),
        },
        Commands::Dashboard { json } => dashboard::execute(app, json).map(|_| ()),
        Commands::Recipes { product_type } => recipes::execute(app, product_type.as_deref()),
        Commands::Watch { once } => watch::execute(app, once),
    }
}
