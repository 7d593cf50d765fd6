/// Extraction tests against fixture markup shaped like the platform's
/// rendered search, profile, and comment-panel pages.
use douyin_scout::extract::{comment, user, video};

const SEARCH_PAGE: &str = r#"
<html><body>
  <div data-e2e="scroll-list">
    <ul>
      <li class="SwZLHMKk">
        <a class="hY8lWHgA" href="//www.douyin.com/video/7301"></a>
        <img src="//p3.example.com/cover-a.jpg"/>
        <div class="VDYK8Xd7">拉面教程
全流程</div>
        <span class="MZNczJmS">面点师傅</span>
        <span class="faDtinfi">3天前</span>
        <span class="cIiU4Muu">2.1万</span>
      </li>
      <li class="SwZLHMKk">
        <a class="hY8lWHgA" href="/video/7302"></a>
        <img src="//p3.example.com/cover-b.jpg"/>
        <div class="VDYK8Xd7">家常菜合集</div>
        <span class="MZNczJmS">厨房日记</span>
        <span class="faDtinfi">1周前</span>
        <span class="cIiU4Muu">834</span>
      </li>
      <li class="SwZLHMKk">
        <div class="VDYK8Xd7">无链接卡片（应被丢弃）</div>
      </li>
    </ul>
  </div>
  <ul>
    <li class="SwZLHMKk">
      <a class="hY8lWHgA" href="/video/9999"></a>
      <div class="VDYK8Xd7">容器之外的卡片</div>
    </li>
  </ul>
</body></html>"#;

#[test]
fn search_page_extraction_scopes_to_scroll_list() {
    let records = video::extract_search_videos(SEARCH_PAGE);
    assert_eq!(records.len(), 2, "cards outside the scroll-list must not count");

    let first = &records[0];
    assert_eq!(first.video_url, "//www.douyin.com/video/7301");
    assert_eq!(first.title, "拉面教程 全流程");
    assert_eq!(first.author, "面点师傅");
    assert_eq!(first.likes, "2.1万");

    let second = &records[1];
    assert_eq!(second.video_url, "/video/7302");
    assert_eq!(second.likes, "834");
}

#[test]
fn profile_page_extraction_reads_the_whole_page() {
    // Profile mode is unscoped: the out-of-container card counts too.
    let records = video::extract_videos(SEARCH_PAGE);
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].video_url, "/video/9999");
    assert_eq!(records[2].author, "未知作者");
}

const USER_SEARCH_PAGE: &str = r#"
<html><body>
  <div class="search-result-card">
    <a class="hY8lWHgA poLTDMYS" href="/user/MS4wAbc">
      <img class="RlLOO79h" src="//p9.example.com/avatar.png"/>
      <div class="XQwChAbX"><p class="v9LWb7QE">
        <span><span><span><span><span>街头美食家</span></span></span></span></span>
      </p></div>
      <div class="jjebLXt0">
        <span>抖音号: <span>food_walker</span></span>
        <span>获赞 120.4万</span>
        <span>粉丝 33.1万</span>
      </div>
      <p class="Kdb5Km3i">
        <span><span><span><span><span>带你吃遍全城</span></span></span></span></span>
      </p>
    </a>
  </div>
  <div class="search-result-card">
    <a class="hY8lWHgA poLTDMYS" href="/user/NoTitle"></a>
  </div>
</body></html>"#;

#[test]
fn user_cards_require_a_title() {
    let records = user::extract_users(USER_SEARCH_PAGE);
    assert_eq!(records.len(), 1);

    let u = &records[0];
    assert_eq!(u.title, "街头美食家");
    assert_eq!(u.douyin_id, "food_walker");
    assert_eq!(u.likes, "120.4万");
    assert_eq!(u.followers, "33.1万");
    assert_eq!(u.description, "带你吃遍全城");
    assert_eq!(u.user_link, "/user/MS4wAbc");
}

const COMMENT_PANEL: &str = r#"
<html><body>
  <div data-e2e="comment-item">
    <span data-e2e="comment-level-1">学会了，今晚就做</span>
  </div>
  <div data-e2e="comment-item">
    <span data-e2e="comment-level-1">2356</span>
  </div>
  <div data-e2e="comment-item">
    <span data-e2e="comment-level-1">回复</span>
  </div>
  <div data-e2e="comment-item">
    <span data-e2e="comment-level-1">up主声音真好听</span>
  </div>
  <div class="CommentItemNoise"><span>broad strategy must not fire</span></div>
</body></html>"#;

#[test]
fn comment_extraction_keeps_text_and_drops_counters() {
    let comments = comment::extract_comments(COMMENT_PANEL);
    assert_eq!(comments, vec!["学会了，今晚就做", "up主声音真好听"]);
}

#[test]
fn comment_extraction_empty_page_yields_nothing() {
    assert!(comment::extract_comments("<html><body><p>无评论</p></body></html>").is_empty());
}
