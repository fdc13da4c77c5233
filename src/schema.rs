use std::{error::Error, sync::Arc};

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    types::{Me, Message, Update},
    Bot,
};

use crate::{
    commands::{add_category, add_quiz, help, run_quiz},
    triggers::{Trigger, TriggerTable},
};

/// Routes every recognized command to its endpoint. Unrecognized messages are
/// dropped by the dispatcher's default handler.
pub fn schema() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>> {
    use dptree::case;

    Update::filter_message()
        .filter_map(|msg: Message, me: Me, triggers: Arc<TriggerTable>| {
            triggers.parse(msg.text()?, me.username())
        })
        .branch(case![Trigger::Quiz { category }].endpoint(run_quiz::<Bot>))
        .branch(case![Trigger::Help].endpoint(help))
        .branch(case![Trigger::AddQuiz(args)].endpoint(add_quiz))
        .branch(case![Trigger::AddCategory(name)].endpoint(add_category))
}
