use std::{fmt, future::Future};

use teloxide::{
    payloads::SendPollSetters,
    prelude::Requester,
    types::{ChatId, InputPollOption, ParseMode, PollType, Recipient},
    Bot,
};

use crate::{error::DeliveryError, poll::QuizPoll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    Channel,
    Group,
}

/// A configured channel or group that receives every dispatched quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    kind: DestinationKind,
    handle: String,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DestinationKind::Channel => "channel",
            DestinationKind::Group => "group",
        };
        write!(f, "{} {}", kind, self.handle)
    }
}

impl Destination {
    /// Numeric handles are chat ids, anything else is a public username and
    /// gets an `@` prefix when it lacks one. Blank input yields `None`.
    pub fn parse(kind: DestinationKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let handle = if raw.parse::<i64>().is_ok() || raw.starts_with('@') {
            raw.to_owned()
        } else {
            format!("@{raw}")
        };

        Some(Self { kind, handle })
    }

    pub fn channel(raw: &str) -> Option<Self> {
        Self::parse(DestinationKind::Channel, raw)
    }

    pub fn group(raw: &str) -> Option<Self> {
        Self::parse(DestinationKind::Group, raw)
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn chat(&self) -> Recipient {
        match self.handle.parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(self.handle.clone()),
        }
    }
}

/// The one capability the dispatcher needs from the messaging platform.
pub trait PollSender {
    fn send_quiz_poll(
        &self,
        to: &Destination,
        poll: &QuizPoll,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

impl PollSender for Bot {
    async fn send_quiz_poll(&self, to: &Destination, poll: &QuizPoll) -> Result<(), DeliveryError> {
        let options = poll
            .options()
            .iter()
            .cloned()
            .map(InputPollOption::new)
            .collect::<Vec<_>>();

        self.send_poll(to.chat(), poll.title(), options)
            .type_(PollType::Quiz)
            .correct_option_id(poll.correct_index())
            .explanation(poll.explanation())
            .explanation_parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError {
                recipient: to.to_string(),
                reason: e.to_string(),
            })
    }
}
