//! Building and sending authenticated responses.

use crate::{
    connection::{
        rmcp::{self, SessionWrapper},
        CompletionCode, Message,
    },
    dispatch::{Context, Request},
    session::{
        auth::{self, AuthType},
        Session,
    },
};

/// Answer `request` with `completion_code` followed by `data`.
///
/// If the request belongs to a known session, its authentication code is
/// re-verified, both session sequence numbers are advanced and the response
/// is authenticated with the session user's password. A verification failure
/// is logged and, unless [`Config::strict_authentication`] is set, the
/// response is sent anyway. Requests for unknown sessions are answered
/// without authentication under the same rule.
///
/// The response is sent once to the requester; send failures are logged and
/// not retried.
///
/// [`Config::strict_authentication`]: crate::Config::strict_authentication
pub fn respond(
    ctx: &Context<'_>,
    request: &Request<'_>,
    completion_code: CompletionCode,
    data: &[u8],
) {
    let wrapper = request.wrapper;
    let response = request.message.response(completion_code, data);

    let response_wrapper = match ctx.sessions.lookup(wrapper.session_id) {
        Some(handle) => {
            // Held until the response is stamped so that concurrent requests
            // on this session advance the sequence numbers one at a time.
            let mut session = handle.lock();

            match authenticate(ctx, &mut session, request, &response) {
                Some(wrapper) => wrapper,
                None => return,
            }
        }
        None => {
            if wrapper.session_id == 0 {
                log::debug!("Answering sessionless request");
            } else {
                log::warn!("Unable to find session 0x{:08X}", wrapper.session_id);
            }

            if ctx.config.strict_authentication && wrapper.session_id != 0 {
                log::warn!("Dropping request for unknown session 0x{:08X}", wrapper.session_id);
                return;
            }

            SessionWrapper {
                auth_type: AuthType::None,
                sequence_number: wrapper.sequence_number,
                session_id: wrapper.session_id,
                auth_code: None,
            }
        }
    };

    let bytes = match rmcp::encode(&response_wrapper, &response) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Could not encode response: {e:?}");
            return;
        }
    };

    if let Err(e) = ctx.transport.send_to(&bytes, request.from) {
        log::warn!("Failed to send response to {}: {e}", request.from);
    }
}

/// Verify the request against `session`, advance the session and build the
/// authenticated wrapper for `response`.
///
/// Returns `None` if the response must not be sent.
fn authenticate(
    ctx: &Context<'_>,
    session: &mut Session,
    request: &Request<'_>,
    response: &Message,
) -> Option<SessionWrapper> {
    let wrapper = request.wrapper;
    let password = &session.user().password;

    let expected = auth::compute(
        wrapper.auth_type,
        password,
        wrapper.session_id,
        request.payload,
        wrapper.sequence_number,
    );

    let verified = auth::verify(wrapper.auth_code.as_ref(), expected.as_ref());

    let matches_session = wrapper.auth_type == session.auth_type();
    if !matches_session {
        log::warn!(
            "Request uses auth type {:?}, but session 0x{:08X} was opened with {:?}",
            wrapper.auth_type,
            session.id(),
            session.auth_type()
        );
    }

    if verified && matches_session {
        log::debug!("IPMI authentication passed");
    } else {
        log::warn!("IPMI authentication failed for session 0x{:08X}", session.id());

        if ctx.config.strict_authentication {
            return None;
        }
    }

    session.advance();

    let sequence_number = session.remote_sequence();
    let auth_code = auth::compute(
        wrapper.auth_type,
        &session.user().password,
        wrapper.session_id,
        &response.to_bytes(),
        sequence_number,
    );

    Some(SessionWrapper {
        auth_type: wrapper.auth_type,
        sequence_number,
        session_id: wrapper.session_id,
        auth_code,
    })
}
